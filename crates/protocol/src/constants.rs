use serde::{Deserialize, Serialize};

/// Default multipart chunk size (10 MiB).
///
/// Files strictly smaller than this go through a single pre-signed PUT.
pub const DEFAULT_CHUNK_SIZE: u64 = 10 * 1024 * 1024;

/// Largest part count accepted for one multipart upload.
pub const MAX_PART_COUNT: usize = 10_000;

/// Content type used when neither the backend nor the key extension gives one.
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Backend action identifier, sent as the `action` field of every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    #[serde(rename = "get-presigned-put-url")]
    GetPresignedPutUrl,
    #[serde(rename = "create-multipart-upload")]
    CreateMultipartUpload,
    #[serde(rename = "get-presigned-part-urls")]
    GetPresignedPartUrls,
    #[serde(rename = "complete-multipart-upload")]
    CompleteMultipartUpload,
}

impl Action {
    /// Returns the wire name of the action.
    pub fn as_str(self) -> &'static str {
        match self {
            Action::GetPresignedPutUrl => "get-presigned-put-url",
            Action::CreateMultipartUpload => "create-multipart-upload",
            Action::GetPresignedPartUrls => "get-presigned-part-urls",
            Action::CompleteMultipartUpload => "complete-multipart-upload",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
