//! Markup for narrative and extraction results.

use serde_json::{Map, Value};

use super::classify::ResultShape;

/// `risk_level` -> `Risk Level`. Only the first character of each segment
/// changes.
pub fn humanize(key: &str) -> String {
    key.split('_')
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Markup for any classified shape.
pub fn narrative_markup(shape: &ResultShape) -> String {
    match shape {
        ResultShape::NarrativeSingle { content } => content.clone(),
        ResultShape::NarrativeSections { label, sections } => {
            let mut markup = format!("# {}\n\n", label);
            for (key, text) in sections {
                markup.push_str(&format!("## {}\n\n{}\n\n", humanize(key), text));
            }
            markup
        }
        ResultShape::Tabular { label, results } => extraction_markup(label, results),
    }
}

/// Extraction results as headed sections: category `##`, sub-term `###`,
/// list items as bullets.
pub fn extraction_markup(label: &str, results: &Map<String, Value>) -> String {
    let mut markup = format!("# {}\n\n", label);

    for (category, items) in results {
        markup.push_str(&format!("## {}\n\n", humanize(category)));
        match items {
            Value::Array(list) => {
                for item in list {
                    markup.push_str(&format!("- {}\n", item_text(item)));
                }
            }
            Value::Object(terms) => {
                for (term, value) in terms {
                    markup.push_str(&format!("### {}\n{}\n\n", humanize(term), item_text(value)));
                }
            }
            scalar => {
                markup.push_str(&item_text(scalar));
                markup.push('\n');
            }
        }
        markup.push('\n');
    }

    markup
}

/// Strings verbatim, everything else as compact JSON.
pub(crate) fn item_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_humanize() {
        assert_eq!(humanize("risk_level"), "Risk Level");
        assert_eq!(humanize("parties"), "Parties");
        assert_eq!(humanize("Already Title"), "Already Title");
        assert_eq!(humanize("governing_LAW"), "Governing LAW");
        assert_eq!(humanize("double__underscore"), "Double  Underscore");
        assert_eq!(humanize(""), "");
    }

    #[test]
    fn test_sections_markup() {
        let shape = ResultShape::NarrativeSections {
            label: "Risk Assessment".into(),
            sections: vec![
                ("risk_level".into(), "High".into()),
                ("key_risks".into(), "uncapped_liability stays as written".into()),
            ],
        };
        assert_eq!(
            narrative_markup(&shape),
            "# Risk Assessment\n\n## Risk Level\n\nHigh\n\n## Key Risks\n\nuncapped_liability stays as written\n\n"
        );
    }

    #[test]
    fn test_single_markup_is_verbatim() {
        let shape = ResultShape::NarrativeSingle {
            content: "# Contract Summary\n\nThis is a 2-page lease.".into(),
        };
        assert_eq!(
            narrative_markup(&shape),
            "# Contract Summary\n\nThis is a 2-page lease."
        );
    }

    #[test]
    fn test_extraction_markup() {
        let results = json!({
            "key_dates": ["2024-01-01", 30],
            "payment_terms": {"monthly_rent": "$1,200", "deposit": 2400},
            "governing_law": "Delaware"
        });
        let markup = extraction_markup("Information Extraction", results.as_object().unwrap());
        assert_eq!(
            markup,
            "# Information Extraction\n\n\
             ## Key Dates\n\n- 2024-01-01\n- 30\n\n\
             ## Payment Terms\n\n### Monthly Rent\n$1,200\n\n### Deposit\n2400\n\n\n\
             ## Governing Law\n\nDelaware\n\n"
        );
    }

    #[test]
    fn test_list_items_use_compact_json_for_objects() {
        let results = json!({"parties": [{"term": "Lessor", "extracted_value": "Acme"}]});
        let markup = extraction_markup("Information Extraction", results.as_object().unwrap());
        assert!(markup.contains(r#"- {"term":"Lessor","extracted_value":"Acme"}"#));
    }
}
