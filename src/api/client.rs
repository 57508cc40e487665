use crate::api::types::{
    Accounts, CompanyResponse, CompareResponse, FilingsResponse, SearchResponse,
};
use crate::api::validate::{check_cvr, decode_validated, Validate};
use crate::chat::types::{ChatRequest, ChatResponse};
use crate::config::Config;
use crate::error::ApiError;
use reqwest::header::{CONTENT_DISPOSITION, ETAG, IF_NONE_MATCH};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Queries shorter than this never leave the client.
pub const MIN_QUERY_LEN: usize = 2;

/// CSV bytes plus the filename suggested by the server (or a canonical
/// fallback), ready to be written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvDownload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Result of a conditional company fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum CompanyFetch {
    Fresh {
        profile: CompanyResponse,
        etag: Option<String>,
    },
    NotModified,
}

/// HTTP client for the CVRGPT backend.
///
/// Built once from the loaded [`Config`]; every call is independent, with no
/// caching and no retry. The API key travels as `x-api-key` on each request.
pub struct ApiClient {
    base_url: String,
    api_key: Option<String>,
    client: Client,
}

impl ApiClient {
    pub fn new(config: &Config) -> Self {
        Self {
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            api_key: config
                .api_key
                .as_deref()
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(ToString::to_string),
            client: Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .connect_timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }

    fn with_auth(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => builder.header("x-api-key", key),
            None => builder,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn get_validated<T>(&self, url: String) -> Result<T, ApiError>
    where
        T: DeserializeOwned + Validate,
    {
        tracing::debug!(%url, "GET");
        let response = self
            .with_auth(self.client.get(&url))
            .send()
            .await
            .map_err(net_err)?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%url, status = status.as_u16(), "request failed");
            return Err(ApiError::Http {
                status: status.as_u16(),
            });
        }
        let body = response.text().await.map_err(net_err)?;
        decode_validated(&body)
    }

    async fn download_csv(&self, url: String, fallback_name: &str) -> Result<CsvDownload, ApiError> {
        tracing::debug!(%url, "GET (csv)");
        let response = self
            .with_auth(self.client.get(&url))
            .send()
            .await
            .map_err(net_err)?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%url, status = status.as_u16(), "export failed");
            return Err(ApiError::ExportFailed {
                status: status.as_u16(),
            });
        }
        let filename = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(attachment_filename)
            .unwrap_or_else(|| fallback_name.to_string());
        let bytes = response.bytes().await.map_err(net_err)?.to_vec();
        Ok(CsvDownload { filename, bytes })
    }

    /// POST `/chat` — one conversation turn.
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ApiError> {
        let url = self.url("/chat");
        tracing::debug!(%url, messages = request.messages.len(), "POST");
        let response = self
            .with_auth(self.client.post(&url))
            .json(request)
            .send()
            .await
            .map_err(net_err)?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%url, status = status.as_u16(), "chat turn failed");
            return Err(ApiError::Http {
                status: status.as_u16(),
            });
        }
        let body = response.text().await.map_err(net_err)?;
        decode_validated(&body)
    }

    /// GET `/chat/export?thread_id=` — CSV for a whole conversation thread.
    pub async fn export_chat_csv(&self, thread_id: &str) -> Result<CsvDownload, ApiError> {
        let url = format!(
            "{}?thread_id={}",
            self.url("/chat/export"),
            urlencode(thread_id)
        );
        self.download_csv(url, crate::export::THREAD_EXPORT_FILENAME)
            .await
    }

    /// GET `/v1/search?q=&limit=`. Queries under [`MIN_QUERY_LEN`] characters
    /// are refused locally without a network call.
    pub async fn search(&self, query: &str, limit: u32) -> Result<SearchResponse, ApiError> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_LEN {
            return Err(ApiError::QueryTooShort { min: MIN_QUERY_LEN });
        }
        let url = format!(
            "{}?q={}&limit={limit}",
            self.url("/v1/search"),
            urlencode(query)
        );
        self.get_validated(url).await
    }

    /// GET `/v1/company/{cvr}` with `If-None-Match` passthrough. A 304
    /// response maps to [`CompanyFetch::NotModified`]; a fresh body carries
    /// the new `ETag` for the caller's next conditional fetch.
    pub async fn company(
        &self,
        cvr: &str,
        if_none_match: Option<&str>,
    ) -> Result<CompanyFetch, ApiError> {
        check_cvr(cvr, "cvr").map_err(|_| ApiError::InvalidCvr { cvr: cvr.into() })?;
        let url = format!("{}/{cvr}", self.url("/v1/company"));
        tracing::debug!(%url, conditional = if_none_match.is_some(), "GET");
        let mut builder = self.with_auth(self.client.get(&url));
        if let Some(etag) = if_none_match {
            builder = builder.header(IF_NONE_MATCH, etag);
        }
        let response = builder.send().await.map_err(net_err)?;
        let status = response.status();
        if status == StatusCode::NOT_MODIFIED {
            return Ok(CompanyFetch::NotModified);
        }
        if !status.is_success() {
            return Err(ApiError::Http {
                status: status.as_u16(),
            });
        }
        let etag = response
            .headers()
            .get(ETAG)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string);
        let body = response.text().await.map_err(net_err)?;
        let profile = decode_validated(&body)?;
        Ok(CompanyFetch::Fresh { profile, etag })
    }

    /// GET `/v1/compare/{cvr}` — year-over-year comparison.
    pub async fn compare(&self, cvr: &str) -> Result<CompareResponse, ApiError> {
        check_cvr(cvr, "cvr").map_err(|_| ApiError::InvalidCvr { cvr: cvr.into() })?;
        self.get_validated(format!("{}/{cvr}", self.url("/v1/compare")))
            .await
    }

    /// GET `/v1/compare/{cvr}/export` — server-streamed comparison CSV.
    pub async fn export_compare_csv(&self, cvr: &str) -> Result<CsvDownload, ApiError> {
        check_cvr(cvr, "cvr").map_err(|_| ApiError::InvalidCvr { cvr: cvr.into() })?;
        let url = format!("{}/{cvr}/export", self.url("/v1/compare"));
        self.download_csv(url, &crate::export::compare_export_filename(cvr))
            .await
    }

    /// GET `/v1/filings/{cvr}?limit=` — recent filings.
    pub async fn filings(&self, cvr: &str, limit: u32) -> Result<FilingsResponse, ApiError> {
        check_cvr(cvr, "cvr").map_err(|_| ApiError::InvalidCvr { cvr: cvr.into() })?;
        self.get_validated(format!("{}/{cvr}?limit={limit}", self.url("/v1/filings")))
            .await
    }

    /// GET `/v1/accounts/latest/{cvr}` — latest accounts snapshot.
    pub async fn latest_accounts(&self, cvr: &str) -> Result<Accounts, ApiError> {
        check_cvr(cvr, "cvr").map_err(|_| ApiError::InvalidCvr { cvr: cvr.into() })?;
        self.get_validated(format!("{}/{cvr}", self.url("/v1/accounts/latest")))
            .await
    }
}

fn net_err(err: reqwest::Error) -> ApiError {
    ApiError::Network(err.to_string())
}

/// Percent-encode a query value. Only the characters that matter for query
/// strings are escaped; everything unreserved passes through.
fn urlencode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char);
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

/// Pull `filename=` out of a `Content-Disposition: attachment` header.
///
/// The suggestion is only ever a bare file name: anything path-like
/// (separators, `..`) is discarded so a hostile header cannot steer the
/// download outside the working directory, and the caller falls back to the
/// canonical name instead.
fn attachment_filename(header: &str) -> Option<String> {
    let (_, rest) = header.split_once("filename=")?;
    let name = rest
        .split(';')
        .next()
        .unwrap_or(rest)
        .trim()
        .trim_matches('"');
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        None
    } else {
        Some(name.to_string())
    }
}
