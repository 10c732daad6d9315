//! Transfer pipeline: stream a batch of recordings from source to target.
//!
//! Each recording is handled in its own task:
//!
//! 1. Resolve transfer metadata (signed link) right before use
//! 2. Open the download stream
//! 3. Stream it into the store under `{topic}---{meeting_id}.{ext}`
//!
//! Failures, timeouts and panics are recorded per item; the batch always runs to
//! the end. The pipeline never deletes anything.

use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use futures::stream::{self, StreamExt, TryStreamExt};
use recording_migrator_common::{BatchProgress, ProgressCallback};
use recording_migrator_source::{
    RecordingStream, SourceCatalog, SourceError, SourceSession, TransferMetadata,
};
use recording_migrator_storage::{ObjectBody, ObjectKey, StorageClient, StorageError, StoreLocation};
use tokio::task::{JoinError, JoinHandle};

use crate::error::{TransferFailure, TransferFailureCause};
use crate::options::MigrationOptions;
use crate::outcome::TransferReport;

type ItemOutcome = Result<(), TransferFailureCause>;

/// Streams batches of recordings from a source catalog into a store.
pub struct TransferPipeline<S, C> {
    source: Arc<S>,
    store: Arc<C>,
    location: StoreLocation,
    options: MigrationOptions,
}

impl<S, C> TransferPipeline<S, C>
where
    S: SourceCatalog + 'static,
    C: StorageClient + 'static,
{
    /// Create a new pipeline.
    ///
    /// # Arguments
    /// * `source` - Catalog to read recordings from
    /// * `store` - Target store client
    /// * `location` - Bucket and prefix to write to
    pub fn new(source: Arc<S>, store: Arc<C>, location: StoreLocation) -> Self {
        Self {
            source,
            store,
            location,
            options: MigrationOptions::default(),
        }
    }

    /// Set migration options.
    pub fn with_options(mut self, options: MigrationOptions) -> Self {
        self.options = options;
        self
    }

    /// Transfer every requested recording, isolating failures per item.
    ///
    /// # Arguments
    /// * `session` - Operator session (credential, host)
    /// * `meeting_ids` - Recordings to transfer
    /// * `progress` - Optional callback, called once per finished item
    ///
    /// # Returns
    /// How many transfers were started and the per-item failure log in request order.
    pub async fn migrate_batch(
        &self,
        session: &SourceSession,
        meeting_ids: &[String],
        progress: Option<&dyn ProgressCallback>,
    ) -> TransferReport {
        if meeting_ids.is_empty() {
            return TransferReport::default();
        }

        let total: u64 = meeting_ids.len() as u64;
        let session: Arc<SourceSession> = Arc::new(session.clone());
        let cancelled: AtomicBool = AtomicBool::new(false);
        let max_concurrency: usize = self.options.max_concurrency.max(1);

        // Tasks are spawned lazily, so at most `max_concurrency` are ever running.
        let mut in_flight = stream::iter(meeting_ids.iter().cloned().enumerate())
            .map(|(index, meeting_id)| {
                let task: Option<JoinHandle<ItemOutcome>> = if cancelled.load(Ordering::Relaxed) {
                    None
                } else {
                    let item = TransferItem {
                        source: Arc::clone(&self.source),
                        store: Arc::clone(&self.store),
                        location: self.location.clone(),
                        options: self.options.clone(),
                        session: Arc::clone(&session),
                        meeting_id: meeting_id.clone(),
                    };
                    Some(tokio::spawn(item.run()))
                };

                async move {
                    let outcome: ItemOutcome = match task {
                        None => Err(TransferFailureCause::Cancelled),
                        Some(handle) => handle.await.unwrap_or_else(|e| {
                            Err(TransferFailureCause::WorkerPanicked {
                                message: join_error_message(e),
                            })
                        }),
                    };
                    (index, meeting_id, outcome)
                }
            })
            .buffer_unordered(max_concurrency);

        let mut finished: Vec<(usize, String, ItemOutcome)> = Vec::with_capacity(meeting_ids.len());
        let mut completed: u64 = 0;

        while let Some((index, meeting_id, outcome)) = in_flight.next().await {
            if !matches!(outcome, Err(TransferFailureCause::Cancelled)) {
                completed += 1;
                match &outcome {
                    Ok(()) => log::info!("Transferred recording {}", meeting_id),
                    Err(cause) => {
                        log::warn!("Failed migration of recording {}: {}", meeting_id, cause)
                    }
                }

                if let Some(cb) = progress {
                    let update = BatchProgress {
                        meeting_id: meeting_id.clone(),
                        succeeded: outcome.is_ok(),
                        completed,
                        total,
                    };
                    if !cb.on_progress(&update) {
                        log::info!("Batch stopped by progress callback after {} item(s)", completed);
                        cancelled.store(true, Ordering::Relaxed);
                    }
                }
            }
            finished.push((index, meeting_id, outcome));
        }

        finished.sort_by_key(|(index, _, _)| *index);

        let attempted: usize = completed as usize;
        let failures: Vec<TransferFailure> = finished
            .into_iter()
            .filter_map(|(_, meeting_id, outcome)| {
                outcome.err().map(|cause| TransferFailure::new(meeting_id, cause))
            })
            .collect();

        TransferReport {
            attempted,
            failures,
        }
    }
}

/// Everything one spawned transfer task owns.
struct TransferItem<S, C> {
    source: Arc<S>,
    store: Arc<C>,
    location: StoreLocation,
    options: MigrationOptions,
    session: Arc<SourceSession>,
    meeting_id: String,
}

impl<S, C> TransferItem<S, C>
where
    S: SourceCatalog + 'static,
    C: StorageClient + 'static,
{
    async fn run(self) -> ItemOutcome {
        let timeout = self.options.item_timeout;
        match tokio::time::timeout(timeout, self.transfer()).await {
            Ok(outcome) => outcome,
            Err(_) => Err(TransferFailureCause::TimedOut {
                after_secs: timeout.as_secs(),
            }),
        }
    }

    async fn transfer(&self) -> ItemOutcome {
        let metadata: TransferMetadata = self
            .source
            .get_transfer_metadata(&self.session, &self.meeting_id)
            .await
            .map_err(TransferFailureCause::Metadata)?;

        let key: ObjectKey = ObjectKey::new(&metadata.topic, &self.meeting_id, &self.options.extension)
            .map_err(TransferFailureCause::InvalidKey)?;
        let path: String = self.location.object_path(&key);

        log::info!("Downloading recording with meeting ID: {}", self.meeting_id);
        let download: RecordingStream = self
            .source
            .open_download(&metadata)
            .await
            .map_err(TransferFailureCause::Download)?;

        // A source error mid-stream aborts the upload; keep it so the item is
        // reported as a download failure rather than an upload failure.
        let interrupted: Arc<Mutex<Option<SourceError>>> = Arc::new(Mutex::new(None));
        let slot: Arc<Mutex<Option<SourceError>>> = Arc::clone(&interrupted);
        let body = ObjectBody::new(
            download.content_length,
            download
                .body
                .map_err(move |e| {
                    let message: String = format!("download interrupted: {}", e);
                    if let Ok(mut first) = slot.lock() {
                        first.get_or_insert(e);
                    }
                    StorageError::NetworkError { message }
                })
                .boxed(),
        );

        let uploaded: Result<(), StorageError> = self
            .store
            .put_object_stream(
                &self.location.bucket,
                &path,
                body,
                Some(&self.options.content_type),
            )
            .await;

        uploaded.map_err(|upload_err| {
            match interrupted.lock().ok().and_then(|mut first| first.take()) {
                Some(source_err) => TransferFailureCause::Download(source_err),
                None => TransferFailureCause::Upload(upload_err),
            }
        })
    }
}

fn join_error_message(err: JoinError) -> String {
    if !err.is_panic() {
        return err.to_string();
    }
    let payload: Box<dyn Any + Send> = err.into_panic();
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}
