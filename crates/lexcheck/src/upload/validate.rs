//! Upload preconditions.

use crate::config::DEFAULT_MAX_UPLOAD_BYTES;
use crate::error::ValidationError;

use super::SelectedFile;

/// Size and type limits checked before a transfer starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadLimits {
    pub max_bytes: u64,
    /// Lowercase extensions without the leading dot.
    pub allowed_extensions: Vec<String>,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            allowed_extensions: ["txt", "pdf", "doc", "docx"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Check size first, then extension (case-insensitive).
pub fn validate_file(file: &SelectedFile, limits: &UploadLimits) -> Result<(), ValidationError> {
    let size_bytes = file.size_bytes();
    if size_bytes > limits.max_bytes {
        return Err(ValidationError::TooLarge {
            size_bytes,
            max_bytes: limits.max_bytes,
        });
    }

    let extension = file.extension();
    let allowed = extension.as_deref().is_some_and(|ext| {
        limits
            .allowed_extensions
            .iter()
            .any(|a| a.eq_ignore_ascii_case(ext))
    });
    if !allowed {
        return Err(ValidationError::UnsupportedExtension {
            extension,
            allowed: limits.allowed_extensions.clone(),
        });
    }

    Ok(())
}
