//! Result shape classification.
//!
//! Raw results are decoded in a fixed order: plain text, then a labelled
//! object. A labelled body is tried as text, then as extraction output (only
//! under [`EXTRACTION_MARKER`]), then as a set of named fields.

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{json_kind, FormatError};

/// Label the backend uses for extraction results. Matched exactly.
pub const EXTRACTION_MARKER: &str = "Information Extraction";

/// What a raw result turned out to be.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultShape {
    /// Ready-made markup.
    NarrativeSingle { content: String },
    /// A label and its string-valued fields, in source order.
    NarrativeSections {
        label: String,
        sections: Vec<(String, String)>,
    },
    /// Extraction output: category name to items.
    Tabular {
        label: String,
        results: Map<String, Value>,
    },
}

/// A shape plus whatever had to be left out to reach it.
#[derive(Debug, Clone, PartialEq)]
pub struct Classified {
    pub shape: ResultShape,
    pub notices: Vec<FormatError>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawResult {
    Text(String),
    Labelled(Map<String, Value>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Body {
    Text(String),
    Fields(Map<String, Value>),
}

#[derive(Deserialize)]
struct ExtractionBody {
    results: Value,
}

/// Classify a raw analysis result. Pure; the same input always gives the
/// same output.
pub fn classify(raw: &Value) -> Classified {
    let mut notices = Vec::new();
    let shape = match RawResult::deserialize(raw) {
        Ok(RawResult::Text(content)) => ResultShape::NarrativeSingle { content },
        Ok(RawResult::Labelled(map)) => match map.into_iter().next() {
            Some((label, body)) => classify_body(label, body, &mut notices),
            None => {
                notices.push(FormatError::UnrecognizedShape("an empty mapping"));
                ResultShape::NarrativeSingle {
                    content: String::new(),
                }
            }
        },
        Err(_) => {
            notices.push(FormatError::UnrecognizedShape(json_kind(raw)));
            ResultShape::NarrativeSingle {
                content: raw.to_string(),
            }
        }
    };

    for notice in &notices {
        warn!("Partial result: {}", notice);
    }
    debug!("Classified result as {}", shape.name());

    Classified { shape, notices }
}

fn classify_body(label: String, body: Value, notices: &mut Vec<FormatError>) -> ResultShape {
    match Body::deserialize(&body) {
        Ok(Body::Text(text)) => ResultShape::NarrativeSingle {
            content: format!("# {}\n\n{}", label, text),
        },
        Ok(Body::Fields(fields)) => {
            if label == EXTRACTION_MARKER {
                if let Ok(extraction) = ExtractionBody::deserialize(&body) {
                    let results = match extraction.results {
                        Value::Object(results) => results,
                        other => {
                            notices.push(FormatError::ExtractionNotMapping(json_kind(&other)));
                            Map::new()
                        }
                    };
                    return ResultShape::Tabular { label, results };
                }
            }

            let mut sections = Vec::new();
            for (key, value) in fields {
                match value {
                    Value::String(text) => sections.push((key, text)),
                    other => notices.push(FormatError::SkippedField {
                        key,
                        found: json_kind(&other),
                    }),
                }
            }
            ResultShape::NarrativeSections { label, sections }
        }
        Err(_) => {
            notices.push(FormatError::SkippedField {
                key: label.clone(),
                found: json_kind(&body),
            });
            ResultShape::NarrativeSections {
                label,
                sections: Vec::new(),
            }
        }
    }
}

impl ResultShape {
    pub fn name(&self) -> &'static str {
        match self {
            ResultShape::NarrativeSingle { .. } => "narrative",
            ResultShape::NarrativeSections { .. } => "sections",
            ResultShape::Tabular { .. } => "tabular",
        }
    }

    pub fn is_tabular(&self) -> bool {
        matches!(self, ResultShape::Tabular { .. })
    }
}
