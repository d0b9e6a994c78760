//! lexcheck - legal document upload and AI analysis client.
//!
//! Core library: upload state machine, analysis request gate, result
//! classification and formatting, and sanitized markup rendering.

pub mod analysis;
pub mod client;
pub mod config;
pub mod error;
pub mod render;
pub mod results;
pub mod upload;
pub mod utils;

pub use analysis::{
    find_kind, AnalysisForm, AnalysisKind, AnalysisRequest, AnalysisSession, SubmitStatus,
    ANALYSIS_KINDS,
};
pub use client::ApiClient;
pub use config::{load_settings, Config, ConfigError, LoadOptions, Settings};
pub use error::{ApiError, FormatError, RenderError, ValidationError};
pub use render::{MarkupRenderer, ReportPage, TrustedHtml};
pub use results::{
    classify, prepare, ExtractionSummary, PreparedResult, RenderableDocument, ResultShape,
    TabularRow,
};
pub use upload::{ProcessedDocument, ProgressEvent, SelectedFile, TransferState, UploadController};
