//! Invariant checks applied to every inbound payload before rendering code
//! trusts it. Serde handles the shape; this module enforces what the type
//! system can't express: CVR width, citation URL well-formedness, and table
//! row arity. The first violation fails the whole response with a
//! `SchemaMismatch` naming the offending field.

use crate::api::types::{
    Accounts, Citation, CompanyResponse, CompareResponse, FilingsResponse, SearchResponse,
};
use crate::chat::types::{Block, ChatResponse};
use crate::error::ApiError;
use serde::de::DeserializeOwned;
use url::Url;

/// CVR identifiers are always exactly 8 characters.
pub const CVR_LEN: usize = 8;

pub trait Validate {
    fn validate(&self) -> Result<(), ApiError>;
}

/// Parse a JSON body and run the type's invariant checks.
pub fn decode_validated<T>(body: &str) -> Result<T, ApiError>
where
    T: DeserializeOwned + Validate,
{
    let value: T = serde_json::from_str(body).map_err(|e| ApiError::SchemaMismatch {
        path: decode_error_path(&e),
    })?;
    value.validate()?;
    Ok(value)
}

/// Reduce a serde error to the field detail, dropping the position suffix.
fn decode_error_path(err: &serde_json::Error) -> String {
    let message = err.to_string();
    match message.find(" at line ") {
        Some(idx) => message[..idx].to_string(),
        None => message,
    }
}

pub fn check_cvr(cvr: &str, path: &str) -> Result<(), ApiError> {
    if cvr.chars().count() == CVR_LEN {
        Ok(())
    } else {
        Err(ApiError::SchemaMismatch {
            path: path.to_string(),
        })
    }
}

fn check_citations(citations: &[Citation], path: &str) -> Result<(), ApiError> {
    for (i, citation) in citations.iter().enumerate() {
        if Url::parse(&citation.url).is_err() {
            return Err(ApiError::SchemaMismatch {
                path: format!("{path}[{i}].url"),
            });
        }
    }
    Ok(())
}

impl Validate for SearchResponse {
    fn validate(&self) -> Result<(), ApiError> {
        for (i, item) in self.items.iter().enumerate() {
            check_cvr(&item.cvr, &format!("items[{i}].cvr"))?;
        }
        check_citations(&self.citations, "citations")
    }
}

impl Validate for CompanyResponse {
    fn validate(&self) -> Result<(), ApiError> {
        check_cvr(&self.company.cvr, "company.cvr")?;
        check_citations(&self.citations, "citations")
    }
}

impl Validate for FilingsResponse {
    fn validate(&self) -> Result<(), ApiError> {
        for (i, filing) in self.filings.iter().enumerate() {
            if let Some(url) = &filing.url {
                if Url::parse(url).is_err() {
                    return Err(ApiError::SchemaMismatch {
                        path: format!("filings[{i}].url"),
                    });
                }
            }
            check_citations(&filing.citations, &format!("filings[{i}].citations"))?;
        }
        check_citations(&self.citations, "citations")
    }
}

impl Validate for Accounts {
    fn validate(&self) -> Result<(), ApiError> {
        check_citations(&self.citations, "citations")
    }
}

impl Validate for CompareResponse {
    fn validate(&self) -> Result<(), ApiError> {
        check_citations(&self.sources, "sources")
    }
}

impl Validate for ChatResponse {
    fn validate(&self) -> Result<(), ApiError> {
        for (i, block) in self.blocks.iter().enumerate() {
            if let Block::Table { columns, rows, .. } = block {
                for (j, row) in rows.iter().enumerate() {
                    if row.len() != columns.len() {
                        return Err(ApiError::SchemaMismatch {
                            path: format!("blocks[{i}].rows[{j}]"),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_reports_missing_field_without_position() {
        let err = decode_validated::<CompanyResponse>(r#"{"citations":[]}"#).unwrap_err();
        let ApiError::SchemaMismatch { path } = err else {
            panic!("expected schema mismatch");
        };
        assert!(path.contains("company"), "got path {path:?}");
        assert!(!path.contains("line"), "position leaked into {path:?}");
    }

    #[test]
    fn short_cvr_fails_with_field_path() {
        let err = decode_validated::<CompanyResponse>(
            r#"{"company":{"cvr":"1234","name":"Demo"}}"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ApiError::SchemaMismatch { path } if path == "company.cvr"
        ));
    }

    #[test]
    fn search_item_cvr_is_checked() {
        let err = decode_validated::<SearchResponse>(
            r#"{"items":[{"cvr":"12345678","name":"A"},{"cvr":"99","name":"B"}]}"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ApiError::SchemaMismatch { path } if path == "items[1].cvr"
        ));
    }

    #[test]
    fn malformed_citation_url_is_rejected() {
        let err = decode_validated::<Accounts>(
            r#"{"year":2023,"citations":[{"url":"not a url"}]}"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ApiError::SchemaMismatch { path } if path == "citations[0].url"
        ));
    }

    #[test]
    fn table_row_arity_mismatch_fails_fast() {
        let err = decode_validated::<ChatResponse>(
            r#"{"thread_id":"t1","blocks":[
                {"type":"text","text":"ok"},
                {"type":"table","columns":["Year","Revenue"],"rows":[["2023","1000"],["2022"]]}
            ]}"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ApiError::SchemaMismatch { path } if path == "blocks[1].rows[1]"
        ));
    }

    #[test]
    fn well_formed_chat_response_passes() {
        let response = decode_validated::<ChatResponse>(
            r#"{"thread_id":"t1","blocks":[
                {"type":"table","columns":["Year"],"rows":[["2023"]]},
                {"type":"mystery"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(response.blocks.len(), 2);
        assert_eq!(response.blocks[1], Block::Unknown);
    }

    #[test]
    fn valid_payloads_pass_validation() {
        decode_validated::<SearchResponse>(r#"{"items":[{"cvr":"12345678","name":"A"}]}"#)
            .unwrap();
        decode_validated::<Accounts>(
            r#"{"year":2023,"citations":[{"url":"https://example.com/r.pdf"}]}"#,
        )
        .unwrap();
        decode_validated::<CompareResponse>(r#"{"narrative":"Flat year."}"#).unwrap();
    }
}
