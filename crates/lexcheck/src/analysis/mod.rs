//! Analysis catalog, request gating and submission.

mod form;
mod kind;
mod request;
mod session;

pub use form::{build_request, can_submit, AnalysisForm, SubmitStatus};
pub use kind::{find_kind, AnalysisKind, ANALYSIS_KINDS, DEFAULT_KIND_ID};
pub use request::{AnalysisRequest, AnalyzeResponse};
pub use session::{AnalysisBackend, AnalysisSession};
