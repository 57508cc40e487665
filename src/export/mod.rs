pub mod csv;

pub use csv::{
    compare_export_filename, csv_document, save_bytes, save_csv, BLOCK_EXPORT_FILENAME,
    THREAD_EXPORT_FILENAME,
};
