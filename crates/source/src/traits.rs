//! Source catalog interface.

use async_trait::async_trait;

use crate::error::SourceError;
use crate::types::{MeetingRecord, RecordingStream, SourceSession, TransferMetadata};

/// Recording operations the migration needs from the source platform.
#[async_trait]
pub trait SourceCatalog: Send + Sync {
    /// List recordings in the session's window, site and host.
    ///
    /// Fails as a whole on any non-success page; never returns a partial list.
    async fn list_recordings(
        &self,
        session: &SourceSession,
    ) -> Result<Vec<MeetingRecord>, SourceError>;

    /// Resolve the signed download link and topic for one recording.
    ///
    /// Call right before the transfer; the link expires within minutes.
    async fn get_transfer_metadata(
        &self,
        session: &SourceSession,
        meeting_id: &str,
    ) -> Result<TransferMetadata, SourceError>;

    /// Open a streamed download of the recording content.
    async fn open_download(
        &self,
        metadata: &TransferMetadata,
    ) -> Result<RecordingStream, SourceError>;

    /// Irreversibly delete a recording from the source.
    ///
    /// Only call once the copy is confirmed present in the target store.
    async fn delete_recording(
        &self,
        session: &SourceSession,
        meeting_id: &str,
    ) -> Result<(), SourceError>;
}
