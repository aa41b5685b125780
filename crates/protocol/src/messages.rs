use serde::{Deserialize, Serialize};

use crate::types::PartResult;

// ---------------------------------------------------------------------------
// Request payloads
// ---------------------------------------------------------------------------

/// Params of `get-presigned-put-url`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresignedPutUrlRequest {
    pub key: String,
    pub bucket: String,
}

/// Params of `create-multipart-upload`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateMultipartUploadRequest {
    pub key: String,
    pub bucket: String,
}

/// Params of `get-presigned-part-urls`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignedPartUrlsRequest {
    pub key: String,
    pub upload_id: String,
    pub part_count: usize,
    pub bucket: String,
}

/// Params of `complete-multipart-upload`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteMultipartUploadRequest {
    pub key: String,
    pub upload_id: String,
    pub parts: Vec<PartResult>,
    pub bucket: String,
}

// ---------------------------------------------------------------------------
// Response payloads
// ---------------------------------------------------------------------------

/// Response of `get-presigned-put-url`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignedPutUrlResponse {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

/// Response of `create-multipart-upload`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMultipartUploadResponse {
    pub upload_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

/// Response of `get-presigned-part-urls`, ordered by part number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresignedPartUrlsResponse {
    pub urls: Vec<String>,
}
