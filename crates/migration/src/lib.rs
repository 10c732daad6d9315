//! Migration orchestration: move hosted meeting recordings into an object store.
//!
//! A migration run has two phases:
//!
//! - **Transfer** ([`TransferPipeline`]) - stream each selected recording into
//!   the store, recording failures per item
//! - **Reconcile & clean up** ([`reconcile_and_cleanup`]) - re-list the store,
//!   count a recording as migrated only if the transfer did not fail AND the
//!   object is listed, then delete exactly those from the source
//!
//! [`MigrationService`] wires both phases together with the reconciler that
//! flags already-migrated recordings in catalog listings.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use recording_migrator_migration::MigrationService;
//!
//! let service = MigrationService::new(Arc::new(catalog), Arc::new(store), location);
//! let result = service.migrate_batch(&session, &ids, None).await?;
//! for item in &result.failed {
//!     println!("{}: {}", item.record.id, item.reason);
//! }
//! ```

pub mod cleanup;
mod error;
mod options;
mod outcome;
pub mod pipeline;
pub mod reconcile;
mod service;

pub use cleanup::{partition_batch, reconcile_and_cleanup};
pub use error::{MigrationError, TransferFailure, TransferFailureCause};
pub use options::MigrationOptions;
pub use outcome::{
    dedupe_preserving_order, FailedItem, FailureReason, MigratedItem, MigrationResult,
    SourceCleanup, TransferReport,
};
pub use pipeline::TransferPipeline;
pub use reconcile::{annotate, list_migrated_ids, migrated_ids_from_objects, AnnotatedMeeting};
pub use service::MigrationService;
