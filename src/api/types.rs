//! Typed projections of the backend's REST resources.
//!
//! Every payload crossing the wire is decoded into one of these before any
//! rendering code touches it. Numeric metric fields are nullable floats:
//! absent and `null` are both `None` and render as "n/a", never as zero.

use serde::{Deserialize, Serialize};

/// A source reference attached to data shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retrieved_at: Option<String>,
}

// ── /v1/search ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchItem {
    pub cvr: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub items: Vec<SearchItem>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub citations: Vec<Citation>,
}

// ── /v1/company/{cvr} ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Industry {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub cvr: String,
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub industry: Option<Industry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyResponse {
    pub company: Company,
    #[serde(default)]
    pub citations: Vec<Citation>,
}

// ── /v1/filings/{cvr} ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filing {
    pub id: String,
    pub year: i32,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub citations: Vec<Citation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilingsResponse {
    pub filings: Vec<Filing>,
    #[serde(default)]
    pub citations: Vec<Citation>,
}

// ── /v1/accounts/latest/{cvr} ────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Accounts {
    pub year: i32,
    #[serde(default)]
    pub revenue: Option<f64>,
    #[serde(default)]
    pub ebit: Option<f64>,
    #[serde(default)]
    pub equity: Option<f64>,
    #[serde(default)]
    pub citations: Vec<Citation>,
}

// ── /v1/compare/{cvr} ────────────────────────────────────────────────────

/// Year-over-year change for one financial metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountsDelta {
    pub field: String,
    #[serde(default)]
    pub current_value: Option<f64>,
    #[serde(default)]
    pub previous_value: Option<f64>,
    #[serde(default)]
    pub absolute_change: Option<f64>,
    #[serde(default)]
    pub percentage_change: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompareResponse {
    #[serde(default)]
    pub current_period: Option<String>,
    #[serde(default)]
    pub previous_period: Option<String>,
    #[serde(default)]
    pub key_changes: Vec<AccountsDelta>,
    pub narrative: String,
    #[serde(default)]
    pub sources: Vec<Citation>,
}

/// Format a nullable metric for display. Absent and null both read "n/a";
/// a missing number is never shown as zero.
pub fn display_metric(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.2}"),
        None => "n/a".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accounts_null_and_absent_both_none() {
        let accounts: Accounts =
            serde_json::from_str(r#"{"year":2023,"revenue":null,"ebit":1200.5}"#).unwrap();
        assert_eq!(accounts.revenue, None);
        assert_eq!(accounts.equity, None);
        assert_eq!(accounts.ebit, Some(1200.5));
        assert!(accounts.citations.is_empty());
    }

    #[test]
    fn display_metric_never_shows_zero_for_missing() {
        assert_eq!(display_metric(None), "n/a");
        assert_eq!(display_metric(Some(0.0)), "0.00");
        assert_eq!(display_metric(Some(1234.5)), "1234.50");
    }

    #[test]
    fn search_response_decodes_items() {
        let response: SearchResponse = serde_json::from_str(
            r#"{"items":[{"cvr":"12345678","name":"Demo IT ApS","status":"NORMAL"}],"total":1}"#,
        )
        .unwrap();
        assert_eq!(response.items.len(), 1);
        assert_eq!(response.items[0].cvr, "12345678");
        assert_eq!(response.total, Some(1));
    }

    #[test]
    fn compare_response_decodes_key_changes() {
        let response: CompareResponse = serde_json::from_str(
            r#"{
                "current_period": "2024",
                "previous_period": "2023",
                "key_changes": [
                    {"field": "revenue", "current_value": 1100.0, "previous_value": 1000.0,
                     "absolute_change": 100.0, "percentage_change": 0.1}
                ],
                "narrative": "Revenue grew 10% YoY.",
                "sources": [{"url": "https://example.com/filing.pdf", "title": "Annual report"}]
            }"#,
        )
        .unwrap();
        assert_eq!(response.key_changes[0].field, "revenue");
        assert_eq!(response.key_changes[0].percentage_change, Some(0.1));
        assert_eq!(response.sources[0].title.as_deref(), Some("Annual report"));
    }

    #[test]
    fn filing_renames_type_field() {
        let filing: Filing =
            serde_json::from_str(r#"{"id":"f1","year":2023,"type":"annual_report"}"#).unwrap();
        assert_eq!(filing.kind, "annual_report");
        assert!(filing.url.is_none());
    }

    #[test]
    fn extra_fields_are_ignored() {
        let company: CompanyResponse = serde_json::from_str(
            r#"{"company":{"cvr":"12345678","name":"Demo","officers":[{"name":"x"}]},"etag":"abc"}"#,
        )
        .unwrap();
        assert_eq!(company.company.name, "Demo");
    }
}
