//! Migration service: the operations exposed to an operator front-end.

use std::collections::HashSet;
use std::sync::Arc;

use recording_migrator_common::ProgressCallback;
use recording_migrator_source::{MeetingRecord, SourceCatalog, SourceSession};
use recording_migrator_storage::{StorageClient, StoreLocation};

use crate::cleanup::reconcile_and_cleanup;
use crate::error::MigrationError;
use crate::options::MigrationOptions;
use crate::outcome::{dedupe_preserving_order, MigrationResult, TransferReport};
use crate::pipeline::TransferPipeline;
use crate::reconcile::{annotate, list_migrated_ids, AnnotatedMeeting};

/// Lists, reconciles and migrates recordings between a source catalog and a store.
pub struct MigrationService<S, C> {
    source: Arc<S>,
    store: Arc<C>,
    location: StoreLocation,
    options: MigrationOptions,
}

impl<S, C> MigrationService<S, C>
where
    S: SourceCatalog + 'static,
    C: StorageClient + 'static,
{
    /// Create a new service.
    ///
    /// # Arguments
    /// * `source` - Catalog to migrate from
    /// * `store` - Target store client
    /// * `location` - Bucket and prefix to migrate into
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

    pub fn location(&self) -> &StoreLocation {
        &self.location
    }

    /// List the session's recordings, flagged with whether each is already migrated.
    pub async fn list_source_recordings(
        &self,
        session: &SourceSession,
    ) -> Result<Vec<AnnotatedMeeting>, MigrationError> {
        let meetings: Vec<MeetingRecord> = self.source.list_recordings(session).await?;
        let migrated: HashSet<String> = list_migrated_ids(self.store.as_ref(), &self.location).await?;
        Ok(annotate(&meetings, &migrated))
    }

    /// Meeting ids already present in the target store.
    pub async fn list_migrated_ids(&self) -> Result<HashSet<String>, MigrationError> {
        Ok(list_migrated_ids(self.store.as_ref(), &self.location).await?)
    }

    /// Transfer a batch, confirm it against the store, and clean up the source.
    ///
    /// Repeated ids are migrated once. An empty batch makes no calls at all.
    ///
    /// # Arguments
    /// * `session` - Operator session
    /// * `meeting_ids` - Recordings selected by the operator
    /// * `progress` - Optional per-item progress callback
    pub async fn migrate_batch(
        &self,
        session: &SourceSession,
        meeting_ids: &[String],
        progress: Option<&dyn ProgressCallback>,
    ) -> Result<MigrationResult, MigrationError> {
        let requested: Vec<String> = dedupe_preserving_order(meeting_ids);
        if requested.is_empty() {
            return Ok(MigrationResult::empty(self.location.console_link()));
        }

        log::info!("Migrating {} recording(s)", requested.len());
        let pipeline = TransferPipeline::new(
            Arc::clone(&self.source),
            Arc::clone(&self.store),
            self.location.clone(),
        )
        .with_options(self.options.clone());

        let report: TransferReport = pipeline.migrate_batch(session, &requested, progress).await;
        log::info!(
            "Transfer phase done: {} attempted, {} failed",
            report.attempted,
            report.failures.len()
        );

        reconcile_and_cleanup(
            self.source.as_ref(),
            self.store.as_ref(),
            &self.location,
            session,
            &requested,
            &report,
        )
        .await
    }
}
