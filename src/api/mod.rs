pub mod client;
pub mod types;
pub mod validate;

pub use client::{ApiClient, CompanyFetch, CsvDownload, MIN_QUERY_LEN};
pub use types::{
    Accounts, AccountsDelta, Citation, Company, CompanyResponse, CompareResponse, Filing,
    FilingsResponse, Industry, SearchItem, SearchResponse,
};
pub use validate::{decode_validated, Validate};
