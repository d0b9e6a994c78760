//! Extraction export and summary statistics.

use serde::Serialize;

use crate::utils::escape_csv;

use super::tabular::TabularRow;

/// Value the extractor reports when a term was not found.
pub const NOT_SPECIFIED: &str = "Not specified";
/// Section the extractor reports when no clause was located.
pub const SECTION_NOT_FOUND: &str = "Not found";

/// Pretty-printed JSON array of rows.
pub fn rows_to_json(rows: &[TabularRow]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(rows)
}

/// CSV with a header line. Missing sections are left empty.
pub fn rows_to_csv(rows: &[TabularRow]) -> String {
    let mut out = String::from("term,value,section,timestamp\n");
    for row in rows {
        out.push_str(&format!(
            "{},{},{},{}\n",
            escape_csv(&row.term),
            escape_csv(&row.value),
            escape_csv(row.section.as_deref().unwrap_or("")),
            escape_csv(&row.timestamp)
        ));
    }
    out
}

/// Counts over a set of extracted rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionSummary {
    pub total_terms: usize,
    pub terms_found: usize,
    pub sections_found: usize,
    /// One decimal place, e.g. `85.0%`.
    pub completion_rate: String,
}

impl ExtractionSummary {
    pub fn from_rows(rows: &[TabularRow]) -> Self {
        let total_terms = rows.len();
        let terms_found = rows.iter().filter(|r| r.value != NOT_SPECIFIED).count();
        let sections_found = rows
            .iter()
            .filter(|r| r.section.as_deref().is_some_and(|s| s != SECTION_NOT_FOUND))
            .count();
        let rate = if total_terms == 0 {
            0.0
        } else {
            terms_found as f64 * 100.0 / total_terms as f64
        };

        Self {
            total_terms,
            terms_found,
            sections_found,
            completion_rate: format!("{:.1}%", rate),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(term: &str, value: &str, section: Option<&str>) -> TabularRow {
        TabularRow {
            term: term.into(),
            value: value.into(),
            timestamp: "2024-01-01T00:00:00".into(),
            section: section.map(str::to_string),
        }
    }

    #[test]
    fn test_summary() {
        let rows = vec![
            row("Lessor", "Acme Co", Some("1.1")),
            row("Lessee", "Bob", Some("Not found")),
            row("Deposit", "Not specified", Some("Not found")),
            row("Rent", "$1,200", None),
        ];
        let summary = ExtractionSummary::from_rows(&rows);
        assert_eq!(summary.total_terms, 4);
        assert_eq!(summary.terms_found, 3);
        assert_eq!(summary.sections_found, 1);
        assert_eq!(summary.completion_rate, "75.0%");

        assert_eq!(ExtractionSummary::from_rows(&[]).completion_rate, "0.0%");
    }

    #[test]
    fn test_csv_export() {
        let rows = vec![row("Rent", "$1,200", Some("4.2")), row("Lessee", "Bob", None)];
        assert_eq!(
            rows_to_csv(&rows),
            "term,value,section,timestamp\n\
             Rent,\"$1,200\",4.2,2024-01-01T00:00:00\n\
             Lessee,Bob,,2024-01-01T00:00:00\n"
        );
    }

    #[test]
    fn test_json_export_omits_missing_section() {
        let json = rows_to_json(&[row("Lessee", "Bob", None)]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(
            value,
            serde_json::json!([{"term": "Lessee", "value": "Bob", "timestamp": "2024-01-01T00:00:00"}])
        );
    }
}
