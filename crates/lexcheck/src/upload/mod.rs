//! File intake and upload state machine.
//!
//! A transfer attempt goes Idle -> Validating -> InFlight -> Succeeded|Failed.
//! Validation happens before any network activity; progress only moves
//! forward within one attempt; a retry starts a fresh attempt with the same
//! file.

mod controller;
mod transfer;
mod validate;

pub use controller::{
    AttemptHandle, TransferEvent, TransferEventKind, UploadController, UploadTransport,
};
pub use transfer::{
    progress_percent, ProcessedDocument, ProgressEvent, SelectedFile, TransferProgress,
    TransferState, UploadResponse, UploadTransfer,
};
pub use validate::{validate_file, UploadLimits};
