//! Upload error types.

use relaydrop_transfer::TransferError;

/// Errors produced while uploading a file or a batch.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// Non-2xx or malformed response from the backend endpoint.
    #[error("Backend Error: {0}")]
    Backend(String),

    /// Network-level failure talking to the backend or to storage.
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response from a pre-signed storage URL.
    #[error("HTTP {status}")]
    HttpStatus { status: u16 },

    #[error("Missing ETag for part {part_number}")]
    MissingETag { part_number: u32 },

    /// Missing or unusable input, raised before any network activity.
    #[error("{0}")]
    Validation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("upload task failed: {0}")]
    Task(String),
}

impl From<TransferError> for UploadError {
    fn from(err: TransferError) -> Self {
        match err {
            TransferError::Io(e) => UploadError::Io(e),
            other => UploadError::Validation(other.to_string()),
        }
    }
}
