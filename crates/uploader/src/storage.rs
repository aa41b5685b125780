//! Pre-signed storage PUTs.

use std::sync::Arc;

use futures_util::TryStreamExt;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, ETAG};
use tracing::{debug, warn};

use relaydrop_transfer::{ByteStream, STREAM_CHUNK_SIZE, UploadSource};

use crate::BoxFuture;
use crate::error::UploadError;

/// Callback receiving `(bytes_sent, total_bytes)` while a body is streamed.
pub type ByteProgress = Arc<dyn Fn(u64, u64) + Send + Sync>;

/// Object storage reached through pre-signed URLs.
pub trait Storage: Send + Sync {
    /// Uploads the whole `source` to `url` with a single PUT.
    fn put_object<'a>(
        &'a self,
        url: &'a str,
        content_type: &'a str,
        source: &'a UploadSource,
        on_progress: ByteProgress,
    ) -> BoxFuture<'a, Result<(), UploadError>>;

    /// Uploads one streamed part body of `content_length` bytes to `url` and
    /// returns the ETag from the response.
    fn put_part<'a>(
        &'a self,
        url: &'a str,
        content_type: &'a str,
        part_number: u32,
        body: ByteStream,
        content_length: u64,
    ) -> BoxFuture<'a, Result<String, UploadError>>;
}

/// `reqwest`-based storage client.
#[derive(Clone, Default)]
pub struct HttpStorage {
    http: reqwest::Client,
}

impl HttpStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    async fn put_object_inner(
        &self,
        url: &str,
        content_type: &str,
        source: &UploadSource,
        on_progress: ByteProgress,
    ) -> Result<(), UploadError> {
        let total = source.size();
        let mut sent = 0u64;
        let stream = source
            .stream(STREAM_CHUNK_SIZE)
            .await?
            .inspect_ok(move |chunk| {
                sent += chunk.len() as u64;
                on_progress(sent, total);
            });

        let resp = self
            .http
            .put(url)
            .header(CONTENT_TYPE, content_type)
            .header(CONTENT_LENGTH, total)
            .body(reqwest::Body::wrap_stream(stream))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "storage rejected PUT");
            return Err(UploadError::HttpStatus {
                status: status.as_u16(),
            });
        }
        debug!(bytes = total, "object uploaded");
        Ok(())
    }

    async fn put_part_inner(
        &self,
        url: &str,
        content_type: &str,
        part_number: u32,
        body: ByteStream,
        content_length: u64,
    ) -> Result<String, UploadError> {
        let resp = self
            .http
            .put(url)
            .header(CONTENT_TYPE, content_type)
            .header(CONTENT_LENGTH, content_length)
            .body(reqwest::Body::wrap_stream(body))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            warn!(part_number, status = status.as_u16(), "storage rejected part");
            return Err(UploadError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let etag = resp
            .headers()
            .get(ETAG)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .ok_or(UploadError::MissingETag { part_number })?;

        debug!(part_number, bytes = content_length, "part uploaded");
        Ok(etag)
    }
}

impl Storage for HttpStorage {
    fn put_object<'a>(
        &'a self,
        url: &'a str,
        content_type: &'a str,
        source: &'a UploadSource,
        on_progress: ByteProgress,
    ) -> BoxFuture<'a, Result<(), UploadError>> {
        Box::pin(self.put_object_inner(url, content_type, source, on_progress))
    }

    fn put_part<'a>(
        &'a self,
        url: &'a str,
        content_type: &'a str,
        part_number: u32,
        body: ByteStream,
        content_length: u64,
    ) -> BoxFuture<'a, Result<String, UploadError>> {
        Box::pin(self.put_part_inner(
            url,
            content_type,
            part_number,
            body,
            content_length,
        ))
    }
}
