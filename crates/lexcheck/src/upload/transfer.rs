//! Transfer records: the selected file, attempt state and progress events.

use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use crate::error::ApiError;

/// A file chosen for upload. Cheap to clone; the bytes are shared.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    name: String,
    data: Arc<Vec<u8>>,
}

impl SelectedFile {
    /// Wrap in-memory bytes under a display filename.
    pub fn from_bytes(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            data: Arc::new(data),
        }
    }

    /// Read a file from disk.
    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let data = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::from_bytes(name, data))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size_bytes(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Lowercased extension without the dot, if the name has one.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| !e.is_empty())
            .map(|e| e.to_lowercase())
    }

    /// MIME type guessed from the filename.
    pub fn mime_type(&self) -> String {
        mime_guess::from_path(&self.name)
            .first_or_octet_stream()
            .to_string()
    }

    /// Split the contents into owned chunks for a streaming body.
    pub fn chunks(&self, chunk_size: usize) -> Vec<Vec<u8>> {
        self.data
            .chunks(chunk_size.max(1))
            .map(|c| c.to_vec())
            .collect()
    }
}

/// Lifecycle of one transfer attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferState {
    Idle,
    Validating,
    InFlight,
    Succeeded,
    Failed,
}

impl TransferState {
    pub fn as_str(self) -> &'static str {
        match self {
            TransferState::Idle => "idle",
            TransferState::Validating => "validating",
            TransferState::InFlight => "in_flight",
            TransferState::Succeeded => "succeeded",
            TransferState::Failed => "failed",
        }
    }
}

/// The controller's view of the current attempt.
#[derive(Debug, Clone)]
pub struct UploadTransfer {
    pub attempt: u64,
    pub file: SelectedFile,
    pub size_bytes: u64,
    pub extension: Option<String>,
    pub state: TransferState,
    pub progress_percent: u8,
    pub error: Option<ApiError>,
}

impl UploadTransfer {
    pub fn new(attempt: u64, file: SelectedFile) -> Self {
        Self {
            attempt,
            size_bytes: file.size_bytes(),
            extension: file.extension(),
            file,
            state: TransferState::Idle,
            progress_percent: 0,
            error: None,
        }
    }

    /// Raise progress, never lowering it. Returns true if the value changed.
    pub fn advance(&mut self, percent: u8) -> bool {
        let percent = percent.min(100);
        if percent > self.progress_percent {
            self.progress_percent = percent;
            true
        } else {
            false
        }
    }

    pub fn fail(&mut self, error: ApiError) {
        self.state = TransferState::Failed;
        self.progress_percent = 0;
        self.error = Some(error);
    }
}

/// Raw byte counters reported by a transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferProgress {
    pub loaded: u64,
    pub total: Option<u64>,
}

/// `round(100 * loaded / total)`, or 0 when the total is unknown.
pub fn progress_percent(loaded: u64, total: Option<u64>) -> u8 {
    match total {
        Some(total) if total > 0 => {
            let loaded = loaded.min(total) as f64;
            (100.0 * loaded / total as f64).round() as u8
        }
        _ => 0,
    }
}

/// Upload endpoint response. Fields are optional so a malformed success can
/// be reported as a protocol error instead of a decode failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub collection_name: Option<String>,
}

impl UploadResponse {
    /// Both fields present and non-empty, or a protocol error.
    pub fn into_document(self) -> Result<ProcessedDocument, ApiError> {
        let content = self.content.filter(|c| !c.is_empty());
        let collection = self.collection_name.filter(|c| !c.is_empty());
        match (content, collection) {
            (Some(content), Some(collection_id)) => Ok(ProcessedDocument {
                content,
                collection_id,
            }),
            (None, _) => Err(ApiError::Protocol(
                "upload finished without document content".to_string(),
            )),
            (_, None) => Err(ApiError::Protocol(
                "upload finished without a collection name".to_string(),
            )),
        }
    }
}

/// Extracted document text plus the backend's collection identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedDocument {
    pub content: String,
    pub collection_id: String,
}

/// What a consumer sees while an attempt runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Progress { percent: u8 },
    Completed(ProcessedDocument),
}
