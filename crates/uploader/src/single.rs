//! Single pre-signed PUT for files below the chunk size.

use std::sync::Arc;

use tracing::{debug, info};

use relaydrop_transfer::ProgressState;

use crate::backend::{self, Backend};
use crate::error::UploadError;
use crate::storage::{ByteProgress, Storage};
use crate::types::UploadTarget;

/// Uploads `target` with one PUT to a freshly issued pre-signed URL.
///
/// Progress is reported per streamed chunk. The caller publishes the
/// terminal state.
pub async fn upload_single(
    backend: &dyn Backend,
    storage: &dyn Storage,
    target: &UploadTarget,
    progress: &Arc<ProgressState>,
) -> Result<(), UploadError> {
    let (url, content_type) = backend::presigned_put_url(backend, &target.destination).await?;
    debug!(key = %target.destination.key, %content_type, "received pre-signed PUT URL");

    let state = Arc::clone(progress);
    let on_progress: ByteProgress =
        Arc::new(move |loaded: u64, total: u64| state.update_bytes(loaded, total));

    storage
        .put_object(&url, &content_type, &target.source, on_progress)
        .await?;

    info!(key = %target.destination.key, size = target.source.size(), "single upload finished");
    Ok(())
}
