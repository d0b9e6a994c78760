//! Error types shared by the upload and analysis flows.

use reqwest::StatusCode;
use thiserror::Error;

/// Fixed message for an unreachable backend (status 0).
pub const UNREACHABLE_MESSAGE: &str =
    "Unable to connect to the server. Please check if the server is running.";
/// Fixed message for HTTP 413.
pub const PAYLOAD_TOO_LARGE_MESSAGE: &str = "File size is too large. Maximum size is 10MB.";
/// Fixed message for HTTP 415.
pub const UNSUPPORTED_MEDIA_MESSAGE: &str =
    "Invalid file type. Allowed types: txt, pdf, doc, docx";
/// Fallback message for HTTP 500 without a detail field.
pub const SERVER_ERROR_MESSAGE: &str = "Server error occurred";

/// A file rejected before any network activity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("File size exceeds {}MB limit", .max_bytes / (1024 * 1024))]
    TooLarge { size_bytes: u64, max_bytes: u64 },

    #[error("Invalid file type. Allowed types: {}", .allowed.join(", "))]
    UnsupportedExtension {
        extension: Option<String>,
        allowed: Vec<String>,
    },
}

/// Errors surfaced by the upload and analyze endpoints.
///
/// All variants carry owned strings so a failed transfer can keep its error
/// around for display and retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Status 0: connection refused, DNS failure, timeout.
    #[error("{}", UNREACHABLE_MESSAGE)]
    Unreachable(String),

    #[error("{}", PAYLOAD_TOO_LARGE_MESSAGE)]
    PayloadTooLarge,

    #[error("{}", UNSUPPORTED_MEDIA_MESSAGE)]
    UnsupportedMediaType,

    /// HTTP 500, with the server's `detail` surfaced verbatim when present.
    #[error("{}", .detail.as_deref().unwrap_or(SERVER_ERROR_MESSAGE))]
    Server { detail: Option<String> },

    #[error("Error: {detail}")]
    Http { status: u16, detail: String },

    /// The server answered but the response does not match the contract.
    #[error("Unexpected server response: {0}")]
    Protocol(String),

    /// The analyze endpoint reported an `error` field.
    #[error("{0}")]
    Rejected(String),

    /// The client could not be built from its settings (bad API URL).
    #[error("Invalid client configuration: {0}")]
    Config(String),

    #[error("Another request is already in progress")]
    Busy,

    #[error("No previous upload to retry")]
    NothingToRetry,
}

impl ApiError {
    /// Classify a non-success HTTP status and optional server `detail`.
    pub fn from_status(status: StatusCode, detail: Option<String>) -> Self {
        match status.as_u16() {
            413 => ApiError::PayloadTooLarge,
            415 => ApiError::UnsupportedMediaType,
            500 => ApiError::Server { detail },
            code => ApiError::Http {
                status: code,
                detail: detail.unwrap_or_else(|| {
                    format!(
                        "HTTP {} {}",
                        code,
                        status.canonical_reason().unwrap_or("Unknown Status")
                    )
                }),
            },
        }
    }

    /// Classify a transport-level failure (no HTTP status available).
    pub fn from_transport(err: &reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::from_status(status, None);
        }
        if err.is_decode() {
            return ApiError::Protocol(err.to_string());
        }
        ApiError::Unreachable(err.to_string())
    }

    /// Whether resubmitting the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ApiError::Unreachable(_)
                | ApiError::Server { .. }
                | ApiError::Protocol(_)
                | ApiError::Http { .. }
        )
    }

    /// HTTP-style status code, 0 for transport failures.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::Unreachable(_) => Some(0),
            ApiError::PayloadTooLarge => Some(413),
            ApiError::UnsupportedMediaType => Some(415),
            ApiError::Server { .. } => Some(500),
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// A part of an analysis result that could not be displayed as-is.
///
/// Never fatal: the rest of the result is still shown, with these reported
/// alongside it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("field \"{key}\" holds {found} and was not displayed")]
    SkippedField { key: String, found: &'static str },

    #[error("unrecognized result shape ({0})")]
    UnrecognizedShape(&'static str),

    #[error("extraction results are {0}, expected a mapping of categories")]
    ExtractionNotMapping(&'static str),

    #[error("item {index} in category \"{category}\" is malformed: {reason}")]
    MalformedItem {
        category: String,
        index: usize,
        reason: String,
    },
}

/// Markup rendering failure. Recovered inside the renderer.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("highlighting failed for {language}: {message}")]
    Highlight { language: String, message: String },

    #[error("no syntax definition for {0}")]
    UnknownSyntax(String),
}

/// Name of a JSON value's type, for notices.
pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "text",
        serde_json::Value::Array(_) => "a list",
        serde_json::Value::Object(_) => "a mapping",
    }
}

/// Extract the `detail` field from an error body (FastAPI style).
///
/// Non-string details (validation error lists) are returned as compact JSON.
pub fn parse_error_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) if s.trim().is_empty() => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification_messages() {
        assert_eq!(
            ApiError::from_status(StatusCode::PAYLOAD_TOO_LARGE, Some("ignored".into()))
                .to_string(),
            "File size is too large. Maximum size is 10MB."
        );
        assert_eq!(
            ApiError::from_status(StatusCode::UNSUPPORTED_MEDIA_TYPE, None).to_string(),
            "Invalid file type. Allowed types: txt, pdf, doc, docx"
        );
        assert_eq!(
            ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, None).to_string(),
            "Server error occurred"
        );
        assert_eq!(
            ApiError::from_status(
                StatusCode::INTERNAL_SERVER_ERROR,
                Some("Document processing failed: bad pdf".into())
            )
            .to_string(),
            "Document processing failed: bad pdf"
        );
        assert_eq!(
            ApiError::from_status(StatusCode::NOT_FOUND, None).to_string(),
            "Error: HTTP 404 Not Found"
        );
        assert_eq!(
            ApiError::from_status(StatusCode::BAD_GATEWAY, Some("upstream down".into()))
                .to_string(),
            "Error: upstream down"
        );
    }

    #[test]
    fn test_unreachable_message() {
        let err = ApiError::Unreachable("connection refused".into());
        assert_eq!(err.to_string(), UNREACHABLE_MESSAGE);
        assert_eq!(err.status_code(), Some(0));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_validation_messages() {
        let err = ValidationError::TooLarge {
            size_bytes: 11 * 1024 * 1024,
            max_bytes: 10 * 1024 * 1024,
        };
        assert_eq!(err.to_string(), "File size exceeds 10MB limit");

        let err = ValidationError::UnsupportedExtension {
            extension: Some("exe".into()),
            allowed: vec!["txt".into(), "pdf".into(), "doc".into(), "docx".into()],
        };
        assert_eq!(
            err.to_string(),
            "Invalid file type. Allowed types: txt, pdf, doc, docx"
        );
        assert!(!ApiError::from(err).is_retryable());
    }

    #[test]
    fn test_parse_error_detail() {
        assert_eq!(
            parse_error_detail(r#"{"detail": "Analysis failed: boom"}"#),
            Some("Analysis failed: boom".to_string())
        );
        assert_eq!(parse_error_detail(r#"{"detail": null}"#), None);
        assert_eq!(parse_error_detail("not json"), None);
        assert_eq!(
            parse_error_detail(r#"{"detail": [{"loc": ["body"]}]}"#),
            Some(r#"[{"loc":["body"]}]"#.to_string())
        );
    }
}
