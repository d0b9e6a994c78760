//! Static catalog of analysis kinds.

use serde::Serialize;

/// One selectable analysis. `id` is what goes on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnalysisKind {
    pub id: &'static str,
    pub label: &'static str,
    pub requires_collection: bool,
    pub requires_query: bool,
}

impl AnalysisKind {
    const fn plain(id: &'static str, label: &'static str) -> Self {
        Self {
            id,
            label,
            requires_collection: false,
            requires_query: false,
        }
    }
}

pub const DEFAULT_KIND_ID: &str = "contract_review";
const EXTRACTION_KIND_ID: &str = "information_extraction";

pub const ANALYSIS_KINDS: [AnalysisKind; 6] = [
    AnalysisKind::plain("contract_review", "Contract Review"),
    AnalysisKind {
        id: EXTRACTION_KIND_ID,
        label: "Information Extraction",
        requires_collection: true,
        requires_query: false,
    },
    AnalysisKind::plain("legal_research", "Legal Research"),
    AnalysisKind::plain("risk_assessment", "Risk Assessment"),
    AnalysisKind::plain("contract_summary", "Contract Summary"),
    AnalysisKind {
        id: "custom_analysis",
        label: "Custom Analysis",
        requires_collection: false,
        requires_query: true,
    },
];

/// Look up a kind by its wire id.
pub fn find_kind(id: &str) -> Option<&'static AnalysisKind> {
    ANALYSIS_KINDS.iter().find(|k| k.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_ids_are_unique() {
        for (i, a) in ANALYSIS_KINDS.iter().enumerate() {
            for b in &ANALYSIS_KINDS[i + 1..] {
                assert_ne!(a.id, b.id);
            }
        }
    }

    #[test]
    fn test_find_kind() {
        assert!(find_kind(DEFAULT_KIND_ID).is_some());
        let extraction = find_kind("information_extraction").unwrap();
        assert!(extraction.requires_collection);
        assert!(!extraction.requires_query);
        assert!(find_kind("custom_analysis").unwrap().requires_query);
        assert!(find_kind("Contract Review").is_none());
    }
}
