//! Flattening extraction results into rows.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{json_kind, FormatError};

use super::narrative::{humanize, item_text};

/// One extracted term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabularRow {
    pub term: String,
    pub value: String,
    pub timestamp: String,
    /// Clause or paragraph the value was found in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
}

#[derive(Deserialize)]
struct ExtractedItem {
    term: String,
    extracted_value: Value,
    #[serde(default)]
    timestamp: Option<Value>,
    #[serde(default)]
    section: Option<String>,
}

/// Rows in traversal order: categories as they appear, then items as they
/// appear. No sorting or merging.
pub fn tabular_rows(results: &Map<String, Value>) -> (Vec<TabularRow>, Vec<FormatError>) {
    let mut rows = Vec::new();
    let mut notices = Vec::new();

    for (category, items) in results {
        match items {
            Value::Array(list) => {
                for (index, item) in list.iter().enumerate() {
                    match item_row(category, item) {
                        Ok(row) => rows.push(row),
                        Err(reason) => notices.push(FormatError::MalformedItem {
                            category: category.clone(),
                            index,
                            reason,
                        }),
                    }
                }
            }
            Value::Object(terms) => {
                for (term, value) in terms {
                    rows.push(TabularRow {
                        term: humanize(term),
                        value: item_text(value),
                        timestamp: String::new(),
                        section: None,
                    });
                }
            }
            Value::Null => notices.push(FormatError::SkippedField {
                key: category.clone(),
                found: "null",
            }),
            scalar => rows.push(scalar_row(category, scalar)),
        }
    }

    (rows, notices)
}

fn item_row(category: &str, item: &Value) -> Result<TabularRow, String> {
    match item {
        Value::Object(_) => {
            let extracted = ExtractedItem::deserialize(item).map_err(|e| e.to_string())?;
            Ok(TabularRow {
                term: extracted.term,
                value: item_text(&extracted.extracted_value),
                timestamp: extracted
                    .timestamp
                    .as_ref()
                    .map(item_text)
                    .unwrap_or_default(),
                section: extracted.section,
            })
        }
        Value::Array(_) | Value::Null => {
            Err(format!("expected a record, found {}", json_kind(item)))
        }
        scalar => Ok(scalar_row(category, scalar)),
    }
}

fn scalar_row(category: &str, value: &Value) -> TabularRow {
    TabularRow {
        term: humanize(category),
        value: item_text(value),
        timestamp: String::new(),
        section: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows_of(results: Value) -> (Vec<TabularRow>, Vec<FormatError>) {
        tabular_rows(results.as_object().unwrap())
    }

    fn row(term: &str, value: &str, timestamp: &str) -> TabularRow {
        TabularRow {
            term: term.into(),
            value: value.into(),
            timestamp: timestamp.into(),
            section: None,
        }
    }

    #[test]
    fn test_records_pass_through() {
        let (rows, notices) = rows_of(json!({
            "Parties": [{"term": "Lessor", "extracted_value": "Acme Co", "timestamp": "2024-01-01"}]
        }));
        assert_eq!(rows, vec![row("Lessor", "Acme Co", "2024-01-01")]);
        assert!(notices.is_empty());
    }

    #[test]
    fn test_non_text_timestamps_pass_through() {
        let (rows, notices) = rows_of(json!({
            "Parties": [
                {"term": "Lessor", "extracted_value": "Acme", "timestamp": 1704067200},
                {"term": "Lessee", "extracted_value": "Bob", "timestamp": null}
            ]
        }));
        assert_eq!(
            rows,
            vec![row("Lessor", "Acme", "1704067200"), row("Lessee", "Bob", "")]
        );
        assert!(notices.is_empty());
    }

    #[test]
    fn test_traversal_order_without_dedup() {
        let (rows, _) = rows_of(json!({
            "Zeta": [
                {"term": "B", "extracted_value": "2", "timestamp": "t2"},
                {"term": "A", "extracted_value": "1", "timestamp": "t1"}
            ],
            "Alpha": [
                {"term": "B", "extracted_value": "2", "timestamp": "t2"}
            ]
        }));
        let terms: Vec<_> = rows.iter().map(|r| r.term.as_str()).collect();
        assert_eq!(terms, vec!["B", "A", "B"]);
    }

    #[test]
    fn test_section_is_kept() {
        let (rows, _) = rows_of(json!({
            "Termination": [{
                "term": "Notice period",
                "extracted_value": "90 days",
                "section": "12.1",
                "timestamp": "2024-05-02T10:00:00"
            }]
        }));
        assert_eq!(rows[0].section.as_deref(), Some("12.1"));
    }

    #[test]
    fn test_nested_and_scalar_categories() {
        let (rows, notices) = rows_of(json!({
            "payment_terms": {"monthly_rent": "$1,200"},
            "key_dates": ["2024-01-01"],
            "governing_law": "Delaware",
            "empty": null
        }));
        assert_eq!(
            rows,
            vec![
                row("Monthly Rent", "$1,200", ""),
                row("Key Dates", "2024-01-01", ""),
                row("Governing Law", "Delaware", ""),
            ]
        );
        assert_eq!(notices.len(), 1);
    }

    #[test]
    fn test_malformed_items_become_notices() {
        let (rows, notices) = rows_of(json!({
            "Parties": [
                {"extracted_value": "no term"},
                [1, 2],
                {"term": "Lessee", "extracted_value": "Bob", "timestamp": "t"}
            ]
        }));
        assert_eq!(rows, vec![row("Lessee", "Bob", "t")]);
        assert_eq!(notices.len(), 2);
        assert!(matches!(
            &notices[1],
            FormatError::MalformedItem { index: 1, .. }
        ));
    }
}
