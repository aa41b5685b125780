//! Batch upload coordinator.
//!
//! Plans every file of a batch, then uploads all of them concurrently, each
//! on its own task. The batch fails with the first error observed.

use std::sync::Arc;

use futures_util::StreamExt;
use futures_util::stream::FuturesUnordered;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use relaydrop_protocol::StorageKey;
use relaydrop_transfer::{ChunkPlan, ProgressSink, ProgressState, file_extension, plan};

use crate::backend::Backend;
use crate::error::UploadError;
use crate::multipart::MultipartUpload;
use crate::single::upload_single;
use crate::storage::Storage;
use crate::types::{
    BatchRequest, UploadEvent, UploadPath, UploadTarget, UploadedFile, UploaderConfig,
};

/// Coordinates batch uploads and publishes [`UploadEvent`]s.
pub struct UploadCoordinator {
    backend: Arc<dyn Backend>,
    storage: Arc<dyn Storage>,
    config: UploaderConfig,
    events_tx: mpsc::UnboundedSender<UploadEvent>,
    events_rx: Option<mpsc::UnboundedReceiver<UploadEvent>>,
}

impl UploadCoordinator {
    /// Creates a coordinator.
    pub fn new(
        backend: Arc<dyn Backend>,
        storage: Arc<dyn Storage>,
        config: UploaderConfig,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            backend,
            storage,
            config,
            events_tx,
            events_rx: Some(events_rx),
        }
    }

    /// Takes the event receiver. Can only be called once.
    pub fn take_events(&mut self) -> Option<mpsc::UnboundedReceiver<UploadEvent>> {
        self.events_rx.take()
    }

    pub fn config(&self) -> &UploaderConfig {
        &self.config
    }

    /// Resolves the destination of every file in `request`.
    ///
    /// Each target gets a fresh id; keys follow the configured layout.
    pub fn targets(&self, request: &BatchRequest) -> Vec<UploadTarget> {
        request
            .files
            .iter()
            .map(|file| {
                let key = self.config.layout.object_key(
                    &request.folder,
                    &request.game_name,
                    file_extension(&file.name),
                );
                UploadTarget {
                    id: uuid::Uuid::new_v4().to_string(),
                    name: file.name.clone(),
                    kind: file.kind,
                    source: file.source.clone(),
                    destination: StorageKey::new(self.config.bucket.clone(), key),
                }
            })
            .collect()
    }

    /// Uploads every file of `request`.
    pub async fn upload(&self, request: BatchRequest) -> Result<Vec<UploadedFile>, UploadError> {
        if request.game_name.is_empty() {
            return Err(UploadError::Validation("Please enter a game name.".into()));
        }
        let targets = self.targets(&request);
        self.upload_targets(targets).await
    }

    /// Uploads already-resolved targets.
    ///
    /// Every file is planned before any network activity, so a file that
    /// cannot be planned fails the batch without touching the backend.
    /// Results are returned in input order. When one file fails the error is
    /// returned immediately; the remaining files keep running detached and
    /// still report their own terminal events.
    pub async fn upload_targets(
        &self,
        targets: Vec<UploadTarget>,
    ) -> Result<Vec<UploadedFile>, UploadError> {
        if targets.is_empty() {
            return Ok(Vec::new());
        }

        let plans = targets
            .iter()
            .map(|t| plan(t.source.size(), self.config.chunk_size))
            .collect::<Result<Vec<ChunkPlan>, _>>()?;

        info!(files = targets.len(), bucket = %self.config.bucket, "starting batch upload");

        let mut tasks = FuturesUnordered::new();
        for (index, (target, chunk_plan)) in targets.into_iter().zip(plans).enumerate() {
            let _ = self.events_tx.send(UploadEvent::Started {
                file_id: target.id.clone(),
                name: target.name.clone(),
                key: target.destination.key.clone(),
                size: target.source.size(),
            });

            let backend = Arc::clone(&self.backend);
            let storage = Arc::clone(&self.storage);
            let events_tx = self.events_tx.clone();
            let handle = tokio::spawn(async move {
                upload_file(backend, storage, events_tx, target, chunk_plan).await
            });
            tasks.push(async move { (index, handle.await) });
        }

        let mut results: Vec<Option<UploadedFile>> = vec![None; tasks.len()];
        while let Some((index, joined)) = tasks.next().await {
            match joined {
                Ok(Ok(file)) => results[index] = Some(file),
                Ok(Err(e)) => {
                    let pending = results.iter().filter(|r| r.is_none()).count() - 1;
                    if pending > 0 {
                        warn!(pending, "batch failed; remaining uploads continue detached");
                    }
                    return Err(e);
                }
                Err(e) => return Err(UploadError::Task(e.to_string())),
            }
        }

        info!(files = results.len(), "batch upload finished");
        Ok(results.into_iter().flatten().collect())
    }
}

async fn upload_file(
    backend: Arc<dyn Backend>,
    storage: Arc<dyn Storage>,
    events_tx: mpsc::UnboundedSender<UploadEvent>,
    target: UploadTarget,
    chunk_plan: ChunkPlan,
) -> Result<UploadedFile, UploadError> {
    let sink: Arc<dyn ProgressSink> = Arc::new(EventSink {
        tx: events_tx.clone(),
    });
    let progress = Arc::new(ProgressState::new(target.id.clone(), sink));

    let outcome = if chunk_plan.is_single {
        upload_single(backend.as_ref(), storage.as_ref(), &target, &progress)
            .await
            .map(|()| UploadPath::Single)
    } else {
        MultipartUpload::new(backend.as_ref(), storage.as_ref(), &target, Arc::clone(&progress))
            .run(&chunk_plan.parts)
            .await
            .map(|_| UploadPath::Multipart {
                parts: chunk_plan.part_count(),
            })
    };

    match outcome {
        Ok(path) => {
            progress.complete();
            let _ = events_tx.send(UploadEvent::Completed {
                file_id: target.id.clone(),
                key: target.destination.key.clone(),
            });
            Ok(UploadedFile {
                file_id: target.id,
                name: target.name,
                kind: target.kind,
                size: target.source.size(),
                key: target.destination,
                path,
            })
        }
        Err(e) => {
            let message = e.to_string();
            progress.fail(&message);
            let _ = events_tx.send(UploadEvent::Failed {
                file_id: target.id.clone(),
                error: message.clone(),
            });
            error!(file = %target.name, key = %target.destination.key, error = %message, "upload failed");
            Err(e)
        }
    }
}

/// Forwards progress updates into the coordinator's event channel.
struct EventSink {
    tx: mpsc::UnboundedSender<UploadEvent>,
}

impl ProgressSink for EventSink {
    fn on_progress(&self, file_id: &str, fraction: f64, status: Option<&str>) {
        let _ = self.tx.send(UploadEvent::Progress {
            file_id: file_id.to_string(),
            fraction,
            status: status.map(str::to_string),
        });
    }
}
