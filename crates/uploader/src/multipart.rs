//! Multipart upload through pre-signed part URLs.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures_util::future::try_join_all;
use tracing::{debug, info};

use relaydrop_protocol::PartResult;
use relaydrop_transfer::{PartSpec, ProgressState, STREAM_CHUNK_SIZE};

use crate::backend::{self, Backend};
use crate::error::UploadError;
use crate::storage::Storage;
use crate::types::{MultipartSession, UploadTarget};

/// Drives one multipart upload: create, part URLs, part PUTs, complete.
///
/// All parts are started together. Progress is the fraction of parts whose
/// PUT has settled successfully. The completion request always lists parts
/// in ascending part-number order, however the PUTs finished.
pub struct MultipartUpload<'a> {
    backend: &'a dyn Backend,
    storage: &'a dyn Storage,
    target: &'a UploadTarget,
    progress: Arc<ProgressState>,
}

impl<'a> MultipartUpload<'a> {
    pub fn new(
        backend: &'a dyn Backend,
        storage: &'a dyn Storage,
        target: &'a UploadTarget,
        progress: Arc<ProgressState>,
    ) -> Self {
        Self {
            backend,
            storage,
            target,
            progress,
        }
    }

    /// Uploads `parts` and completes the session.
    ///
    /// On any failure the session is left open on the storage side.
    pub async fn run(&self, parts: &[PartSpec]) -> Result<MultipartSession, UploadError> {
        let session = backend::create_multipart_upload(self.backend, &self.target.destination).await?;
        debug!(
            key = %session.key.key,
            upload_id = %session.upload_id,
            parts = parts.len(),
            "multipart session created"
        );

        let urls = backend::presigned_part_urls(self.backend, &session, parts.len()).await?;
        debug!(upload_id = %session.upload_id, "received part URLs");

        let done = AtomicUsize::new(0);
        let total = parts.len();
        let uploads = parts
            .iter()
            .zip(urls.iter())
            .map(|(part, url)| self.upload_part(&session, *part, url, &done, total));
        let mut results = try_join_all(uploads).await?;
        results.sort_by_key(|r| r.part_number);

        backend::complete_multipart_upload(self.backend, &session, results).await?;
        info!(
            key = %session.key.key,
            upload_id = %session.upload_id,
            parts = total,
            "multipart upload completed"
        );
        Ok(session)
    }

    async fn upload_part(
        &self,
        session: &MultipartSession,
        part: PartSpec,
        url: &str,
        done: &AtomicUsize,
        total: usize,
    ) -> Result<PartResult, UploadError> {
        let body = self
            .target
            .source
            .stream_range(part.byte_start, part.byte_end, STREAM_CHUNK_SIZE)
            .await?;
        let e_tag = self
            .storage
            .put_part(url, &session.content_type, part.index, body, part.len())
            .await?;

        let finished = done.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(
            file_id = self.progress.file_id(),
            part_number = part.index,
            finished,
            total,
            "part settled"
        );
        self.progress.update(finished as f64 / total as f64, None);

        Ok(PartResult {
            e_tag,
            part_number: part.index,
        })
    }
}
