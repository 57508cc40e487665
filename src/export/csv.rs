//! Deterministic CSV serialization for `(columns, rows)` payloads.
//!
//! One quoting rule for header and data cells alike: every cell is wrapped in
//! double quotes with embedded quotes doubled. That keeps cells containing
//! commas, quotes, or newlines round-trip safe under standard quoted-CSV
//! parsing rules.

use std::fs;
use std::io;
use std::path::Path;

/// Filename for a table block's own client-side export.
pub const BLOCK_EXPORT_FILENAME: &str = "events.csv";

/// Filename for a whole-thread export.
pub const THREAD_EXPORT_FILENAME: &str = "export.csv";

/// Filename for a comparison export.
pub fn compare_export_filename(cvr: &str) -> String {
    format!("company_{cvr}_comparison.csv")
}

fn quote_cell(cell: &str) -> String {
    format!("\"{}\"", cell.replace('"', "\"\""))
}

fn format_line(cells: &[String]) -> String {
    cells
        .iter()
        .map(|c| quote_cell(c))
        .collect::<Vec<_>>()
        .join(",")
}

/// Serialize columns and rows into CSV text. The header is the first line;
/// each row follows in input order.
pub fn csv_document(columns: &[String], rows: &[Vec<String>]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(format_line(columns));
    for row in rows {
        lines.push(format_line(row));
    }
    lines.join("\n")
}

/// Write a CSV document to disk - the CLI's version of a browser download.
pub fn save_csv(path: &Path, columns: &[String], rows: &[Vec<String>]) -> io::Result<()> {
    fs::write(path, csv_document(columns, rows))
}

/// Write already-serialized CSV bytes (a server-streamed export) to disk.
pub fn save_bytes(path: &Path, bytes: &[u8]) -> io::Result<()> {
    fs::write(path, bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    /// Minimal quoted-CSV reader used to verify round-trip safety.
    fn parse_csv(input: &str) -> Vec<Vec<String>> {
        let mut records = Vec::new();
        let mut record = Vec::new();
        let mut cell = String::new();
        let mut in_quotes = false;
        let mut chars = input.chars().peekable();

        while let Some(c) = chars.next() {
            if in_quotes {
                if c == '"' {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        cell.push('"');
                    } else {
                        in_quotes = false;
                    }
                } else {
                    cell.push(c);
                }
            } else {
                match c {
                    '"' => in_quotes = true,
                    ',' => record.push(std::mem::take(&mut cell)),
                    '\n' => {
                        record.push(std::mem::take(&mut cell));
                        records.push(std::mem::take(&mut record));
                    }
                    other => cell.push(other),
                }
            }
        }
        record.push(cell);
        records.push(record);
        records
    }

    #[test]
    fn matches_the_expected_document_exactly() {
        let doc = csv_document(
            &cols(&["Year", "Revenue"]),
            &[cols(&["2023", "1000000"])],
        );
        assert_eq!(doc, "\"Year\",\"Revenue\"\n\"2023\",\"1000000\"");
    }

    #[test]
    fn header_cells_are_quoted_like_data_cells() {
        let doc = csv_document(&cols(&["Name, full"]), &[cols(&["Demo, ApS"])]);
        assert_eq!(doc, "\"Name, full\"\n\"Demo, ApS\"");
    }

    #[test]
    fn line_count_is_rows_plus_one() {
        let rows = vec![cols(&["a", "b"]), cols(&["c", "d"]), cols(&["e", "f"])];
        let doc = csv_document(&cols(&["x", "y"]), &rows);
        assert_eq!(doc.split('\n').count(), rows.len() + 1);
    }

    #[test]
    fn empty_cells_survive() {
        let doc = csv_document(&cols(&["a", "b"]), &[cols(&["", "v"])]);
        assert_eq!(doc, "\"a\",\"b\"\n\"\",\"v\"");
    }

    #[test]
    fn quotes_commas_and_newlines_round_trip() {
        let columns = cols(&["name", "note"]);
        let rows = vec![
            cols(&["\"Quoted\" A/S", "line1\nline2"]),
            cols(&["comma, inc", "plain"]),
        ];
        let doc = csv_document(&columns, &rows);

        let parsed = parse_csv(&doc);
        assert_eq!(parsed[0], columns);
        assert_eq!(parsed[1], rows[0]);
        assert_eq!(parsed[2], rows[1]);
    }

    #[test]
    fn save_csv_writes_the_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.csv");
        save_csv(&path, &cols(&["Year"]), &[cols(&["2023"])]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "\"Year\"\n\"2023\"");
    }

    #[test]
    fn compare_filename_embeds_cvr() {
        assert_eq!(
            compare_export_filename("12345678"),
            "company_12345678_comparison.csv"
        );
    }
}
