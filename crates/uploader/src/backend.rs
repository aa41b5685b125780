//! Backend RPC client.
//!
//! Every call is a single JSON `POST` of `{"action": ..., ...params}` to one
//! endpoint. There are no retries at this layer.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use relaydrop_protocol::messages::{
    CompleteMultipartUploadRequest, CreateMultipartUploadRequest, CreateMultipartUploadResponse,
    PresignedPartUrlsRequest, PresignedPartUrlsResponse, PresignedPutUrlRequest,
    PresignedPutUrlResponse,
};
use relaydrop_protocol::{Action, ActionRequest, ErrorBody, PartResult, StorageKey};
use relaydrop_transfer::content_type_for_key;

use crate::BoxFuture;
use crate::error::UploadError;
use crate::types::MultipartSession;

/// Abstract connection to the upload backend.
///
/// [`HttpBackend`] is the production implementation; tests use mocks.
pub trait Backend: Send + Sync {
    /// Sends `action` with `params` (a JSON object) and returns the parsed
    /// JSON response.
    fn call(
        &self,
        action: Action,
        params: serde_json::Value,
    ) -> BoxFuture<'_, Result<serde_json::Value, UploadError>>;
}

/// `reqwest`-based backend client.
pub struct HttpBackend {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpBackend {
    /// Creates a client for the given endpoint URL.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, UploadError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self::with_client(http, endpoint))
    }

    /// Creates a client sharing an existing `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }

    /// Returns the configured endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn post(
        &self,
        action: Action,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, UploadError> {
        let body = ActionRequest::new(action, params).to_value()?;
        debug!(%action, "calling backend");

        let resp = self.http.post(&self.endpoint).json(&body).send().await?;
        let status = resp.status();
        let bytes = resp.bytes().await?;

        if !status.is_success() {
            let message = ErrorBody::message_from_slice(&bytes).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or(status.as_str())
                    .to_string()
            });
            warn!(%action, status = status.as_u16(), error = %message, "backend call failed");
            return Err(UploadError::Backend(message));
        }

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(serde_json::Value::Null);
        }

        serde_json::from_slice(&bytes)
            .map_err(|e| UploadError::Backend(format!("invalid JSON in {action} response: {e}")))
    }
}

impl Backend for HttpBackend {
    fn call(
        &self,
        action: Action,
        params: serde_json::Value,
    ) -> BoxFuture<'_, Result<serde_json::Value, UploadError>> {
        Box::pin(self.post(action, params))
    }
}

// ---------------------------------------------------------------------------
// Typed actions
// ---------------------------------------------------------------------------

async fn call_typed<Req, Resp>(
    backend: &dyn Backend,
    action: Action,
    req: &Req,
) -> Result<Resp, UploadError>
where
    Req: Serialize,
    Resp: DeserializeOwned,
{
    let params = serde_json::to_value(req)?;
    let value = backend.call(action, params).await?;
    serde_json::from_value(value)
        .map_err(|e| UploadError::Backend(format!("unexpected {action} response: {e}")))
}

fn resolve_content_type(from_backend: Option<String>, key: &str) -> String {
    from_backend
        .filter(|ct| !ct.is_empty())
        .unwrap_or_else(|| content_type_for_key(key).to_string())
}

/// `get-presigned-put-url`: returns the PUT URL and its content type.
pub async fn presigned_put_url(
    backend: &dyn Backend,
    target: &StorageKey,
) -> Result<(String, String), UploadError> {
    let req = PresignedPutUrlRequest {
        key: target.key.clone(),
        bucket: target.bucket.clone(),
    };
    let resp: PresignedPutUrlResponse =
        call_typed(backend, Action::GetPresignedPutUrl, &req).await?;
    if resp.url.is_empty() {
        return Err(UploadError::Backend("empty pre-signed URL".into()));
    }
    let content_type = resolve_content_type(resp.content_type, &target.key);
    Ok((resp.url, content_type))
}

/// `create-multipart-upload`: opens a multipart session.
pub async fn create_multipart_upload(
    backend: &dyn Backend,
    target: &StorageKey,
) -> Result<MultipartSession, UploadError> {
    let req = CreateMultipartUploadRequest {
        key: target.key.clone(),
        bucket: target.bucket.clone(),
    };
    let resp: CreateMultipartUploadResponse =
        call_typed(backend, Action::CreateMultipartUpload, &req).await?;
    if resp.upload_id.is_empty() {
        return Err(UploadError::Backend("empty upload id".into()));
    }
    Ok(MultipartSession {
        upload_id: resp.upload_id,
        content_type: resolve_content_type(resp.content_type, &target.key),
        key: target.clone(),
    })
}

/// `get-presigned-part-urls`: one URL per part, ordered by part number.
pub async fn presigned_part_urls(
    backend: &dyn Backend,
    session: &MultipartSession,
    part_count: usize,
) -> Result<Vec<String>, UploadError> {
    let req = PresignedPartUrlsRequest {
        key: session.key.key.clone(),
        upload_id: session.upload_id.clone(),
        part_count,
        bucket: session.key.bucket.clone(),
    };
    let resp: PresignedPartUrlsResponse =
        call_typed(backend, Action::GetPresignedPartUrls, &req).await?;
    if resp.urls.len() != part_count {
        return Err(UploadError::Backend(format!(
            "expected {part_count} part URLs, got {}",
            resp.urls.len()
        )));
    }
    Ok(resp.urls)
}

/// `complete-multipart-upload`: finalizes the session. The response is ignored.
pub async fn complete_multipart_upload(
    backend: &dyn Backend,
    session: &MultipartSession,
    parts: Vec<PartResult>,
) -> Result<(), UploadError> {
    let req = CompleteMultipartUploadRequest {
        key: session.key.key.clone(),
        upload_id: session.upload_id.clone(),
        parts,
        bucket: session.key.bucket.clone(),
    };
    let params = serde_json::to_value(&req)?;
    backend
        .call(Action::CompleteMultipartUpload, params)
        .await?;
    Ok(())
}
