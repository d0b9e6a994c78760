//! Analyze endpoint payloads.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;

/// Body of `POST /analyze`. Built once per submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub content: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_query: Option<String>,
}

/// Analyze response.
///
/// The documented envelope is `{status, result?, error?}`, but the backend
/// also answers with the bare analysis object. Both are accepted.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalyzeResponse {
    Result(Value),
    Error(String),
    /// An envelope with neither a `result` nor an `error`.
    Empty,
}

const ENVELOPE_KEYS: [&str; 3] = ["status", "result", "error"];

impl AnalyzeResponse {
    pub fn from_value(body: Value) -> Self {
        if let Value::Object(map) = &body {
            match map.get("error") {
                Some(Value::String(e)) if !e.is_empty() => return Self::Error(e.clone()),
                Some(Value::Null) | None => {}
                Some(Value::String(_)) => {}
                Some(other) => return Self::Error(other.to_string()),
            }
            if let Some(result) = map.get("result").filter(|r| !r.is_null()) {
                return Self::Result(result.clone());
            }
            let envelope_only = map.keys().all(|k| ENVELOPE_KEYS.contains(&k.as_str()));
            if map.contains_key("status") && envelope_only {
                return Self::Empty;
            }
        }
        Self::Result(body)
    }

    pub fn into_result(self) -> Result<Value, ApiError> {
        match self {
            AnalyzeResponse::Result(value) => Ok(value),
            AnalyzeResponse::Error(message) => Err(ApiError::Rejected(message)),
            AnalyzeResponse::Empty => Err(ApiError::Protocol(
                "analysis finished without a result".to_string(),
            )),
        }
    }
}
