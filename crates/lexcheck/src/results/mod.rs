//! Turning raw analysis results into something displayable.

mod classify;
mod export;
mod narrative;
mod tabular;

use serde_json::Value;
use tracing::warn;

use crate::error::FormatError;

pub use classify::{classify, Classified, ResultShape, EXTRACTION_MARKER};
pub use export::{
    rows_to_csv, rows_to_json, ExtractionSummary, NOT_SPECIFIED, SECTION_NOT_FOUND,
};
pub use narrative::{extraction_markup, humanize, narrative_markup};
pub use tabular::{tabular_rows, TabularRow};

/// The displayable form of a result.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderableDocument {
    Narrative { markup: String },
    Tabular { label: String, rows: Vec<TabularRow> },
}

/// A classified and formatted result.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedResult {
    pub document: RenderableDocument,
    /// Markup for every shape. For tabular results this is the extraction
    /// laid out as headed sections.
    pub markup: String,
    pub notices: Vec<FormatError>,
}

impl PreparedResult {
    pub fn rows(&self) -> Option<&[TabularRow]> {
        match &self.document {
            RenderableDocument::Tabular { rows, .. } => Some(rows),
            RenderableDocument::Narrative { .. } => None,
        }
    }

    pub fn is_partial(&self) -> bool {
        !self.notices.is_empty()
    }
}

/// Classify and format a raw result in one step.
pub fn prepare(raw: &Value) -> PreparedResult {
    let Classified { shape, mut notices } = classify(raw);
    let markup = narrative_markup(&shape);

    let document = match shape {
        ResultShape::Tabular { label, results } => {
            let (rows, row_notices) = tabular_rows(&results);
            for notice in &row_notices {
                warn!("Partial result: {}", notice);
            }
            notices.extend(row_notices);
            RenderableDocument::Tabular { label, rows }
        }
        _ => RenderableDocument::Narrative {
            markup: markup.clone(),
        },
    };

    PreparedResult {
        document,
        markup,
        notices,
    }
}
