//! Submission gating for the analysis form.

use std::fmt;

use crate::error::ApiError;

use super::kind::{find_kind, AnalysisKind, ANALYSIS_KINDS, DEFAULT_KIND_ID};
use super::request::AnalysisRequest;

/// Whether a request for `kind` may be sent with the given inputs.
pub fn can_submit(
    kind: &AnalysisKind,
    document_present: bool,
    collection_present: bool,
    query: &str,
) -> bool {
    if !document_present {
        return false;
    }
    if kind.requires_collection && !collection_present {
        return false;
    }
    if kind.requires_query && query.trim().is_empty() {
        return false;
    }
    true
}

/// Build the wire request. Empty collection or query values are omitted.
pub fn build_request(
    kind: &AnalysisKind,
    content: &str,
    collection: Option<&str>,
    query: Option<&str>,
) -> AnalysisRequest {
    AnalysisRequest {
        content: content.to_string(),
        kind: kind.id.to_string(),
        collection_name: collection.filter(|c| !c.is_empty()).map(str::to_string),
        custom_query: query.filter(|q| !q.is_empty()).map(str::to_string),
    }
}

/// Label shown on the submit control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitStatus {
    NoDocument,
    MissingFields,
    Ready,
}

impl SubmitStatus {
    pub fn label(self) -> &'static str {
        match self {
            SubmitStatus::NoDocument => "No document uploaded",
            SubmitStatus::MissingFields => "Please fill in all required fields",
            SubmitStatus::Ready => "Start Analysis",
        }
    }
}

impl fmt::Display for SubmitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Form state: selected kind, query text and the last error. Nothing else.
#[derive(Debug, Clone)]
pub struct AnalysisForm {
    kind: &'static AnalysisKind,
    query: String,
    error: Option<ApiError>,
}

impl Default for AnalysisForm {
    fn default() -> Self {
        Self {
            kind: find_kind(DEFAULT_KIND_ID).unwrap_or(&ANALYSIS_KINDS[0]),
            query: String::new(),
            error: None,
        }
    }
}

impl AnalysisForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(&self) -> &'static AnalysisKind {
        self.kind
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn error(&self) -> Option<&ApiError> {
        self.error.as_ref()
    }

    /// Select a kind by id. Clears the error, and the query if the new kind
    /// takes none. Unknown ids leave the form untouched.
    pub fn select_kind(&mut self, id: &str) -> bool {
        let Some(kind) = find_kind(id) else {
            return false;
        };
        self.kind = kind;
        self.error = None;
        if !kind.requires_query {
            self.query.clear();
        }
        true
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn set_error(&mut self, error: ApiError) {
        self.error = Some(error);
    }

    pub fn can_submit(&self, document: Option<&str>, collection: Option<&str>) -> bool {
        can_submit(
            self.kind,
            document.is_some_and(|d| !d.is_empty()),
            collection.is_some_and(|c| !c.is_empty()),
            &self.query,
        )
    }

    pub fn submit_status(&self, document: Option<&str>, collection: Option<&str>) -> SubmitStatus {
        if document.map_or(true, str::is_empty) {
            SubmitStatus::NoDocument
        } else if !self.can_submit(document, collection) {
            SubmitStatus::MissingFields
        } else {
            SubmitStatus::Ready
        }
    }

    /// Build a request if the form is ready; clears the previous error.
    pub fn request(
        &mut self,
        document: Option<&str>,
        collection: Option<&str>,
    ) -> Option<AnalysisRequest> {
        if !self.can_submit(document, collection) {
            return None;
        }
        self.error = None;
        let query = self.kind.requires_query.then_some(self.query.as_str());
        Some(build_request(self.kind, document?, collection, query))
    }
}
