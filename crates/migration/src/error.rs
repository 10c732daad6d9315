//! Error types for migration runs.

use recording_migrator_source::SourceError;
use recording_migrator_storage::{KeyParseError, StorageError};
use thiserror::Error;

/// Session-level failures that abort a whole operation.
///
/// Per-item problems never surface here; they end up in the batch outcome.
#[derive(Error, Debug, Clone)]
pub enum MigrationError {
    /// Source catalog call failed (e.g., listing, expired credential).
    #[error("Source catalog: {0}")]
    Source(#[from] SourceError),

    /// Target store call failed (e.g., listing the bucket).
    #[error("Target store: {0}")]
    Storage(#[from] StorageError),
}

impl MigrationError {
    /// Whether the operator has to re-authenticate before retrying.
    pub fn is_reauthentication_required(&self) -> bool {
        match self {
            MigrationError::Source(e) => e.is_unauthorized(),
            MigrationError::Storage(e) => e.is_access_denied(),
        }
    }
}

/// Why a single recording could not be transferred.
#[derive(Error, Debug, Clone)]
pub enum TransferFailureCause {
    /// Resolving the signed download link failed.
    #[error("resolving transfer metadata: {0}")]
    Metadata(SourceError),

    /// The recording id cannot form a valid object key.
    #[error("building object key: {0}")]
    InvalidKey(KeyParseError),

    /// Opening the download failed.
    #[error("opening download: {0}")]
    Download(SourceError),

    /// Streaming into the target store failed.
    #[error("uploading: {0}")]
    Upload(StorageError),

    /// The item ran past the per-item timeout.
    #[error("timed out after {after_secs}s")]
    TimedOut { after_secs: u64 },

    /// The item's worker panicked.
    #[error("worker panicked: {message}")]
    WorkerPanicked { message: String },

    /// The batch was stopped before this item started.
    #[error("cancelled before start")]
    Cancelled,
}

/// One entry of the per-item failure log.
#[derive(Debug, Clone)]
pub struct TransferFailure {
    pub meeting_id: String,
    pub cause: TransferFailureCause,
}

impl TransferFailure {
    pub fn new(meeting_id: impl Into<String>, cause: TransferFailureCause) -> Self {
        Self {
            meeting_id: meeting_id.into(),
            cause,
        }
    }
}
