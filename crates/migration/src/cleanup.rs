//! Post-transfer reconciliation and source cleanup.
//!
//! The store listing, not the pipeline's own view, decides what counts as
//! migrated. A recording is deleted from the source only when both agree:
//! the transfer reported no failure AND the object is present in the store.

use std::collections::{HashMap, HashSet};

use recording_migrator_source::{MeetingRecord, SourceCatalog, SourceSession};
use recording_migrator_storage::{StorageClient, StoreLocation};

use crate::error::{MigrationError, TransferFailure};
use crate::outcome::{
    FailedItem, FailureReason, MigratedItem, MigrationResult, SourceCleanup, TransferReport,
};
use crate::reconcile::list_migrated_ids;

/// Split a requested batch into confirmed ids and failures.
///
/// # Arguments
/// * `requested` - Batch as requested, without duplicates
/// * `report` - Transfer phase report
/// * `confirmed` - Meeting ids freshly listed from the target store
///
/// # Returns
/// `(migrated, failed)`, both in request order. Every requested id appears in
/// exactly one of them.
pub fn partition_batch(
    requested: &[String],
    report: &TransferReport,
    confirmed: &HashSet<String>,
) -> (Vec<String>, Vec<(String, FailureReason)>) {
    let mut migrated: Vec<String> = Vec::new();
    let mut failed: Vec<(String, FailureReason)> = Vec::new();

    let failures: HashMap<&str, &TransferFailure> = report.failures_by_id();
    for id in requested {
        if let Some(failure) = failures.get(id.as_str()) {
            failed.push((id.clone(), FailureReason::TransferFailed(failure.cause.clone())));
        } else if confirmed.contains(id) {
            migrated.push(id.clone());
        } else {
            failed.push((id.clone(), FailureReason::NotConfirmed));
        }
    }

    (migrated, failed)
}

/// Re-reconcile after a transfer and delete confirmed recordings from the source.
///
/// Deletion failures leave the item migrated with [`SourceCleanup::Kept`]; the
/// recording then exists in both places, which is safe.
///
/// # Arguments
/// * `source` - Source catalog
/// * `store` - Target store client
/// * `location` - Bucket and prefix of migrated recordings
/// * `session` - Operator session
/// * `requested` - Batch as requested, without duplicates
/// * `report` - Transfer phase report
///
/// # Errors
/// Only session-level failures: listing the store or re-listing the catalog.
pub async fn reconcile_and_cleanup<S, C>(
    source: &S,
    store: &C,
    location: &StoreLocation,
    session: &SourceSession,
    requested: &[String],
    report: &TransferReport,
) -> Result<MigrationResult, MigrationError>
where
    S: SourceCatalog + ?Sized,
    C: StorageClient + ?Sized,
{
    if requested.is_empty() {
        return Ok(MigrationResult::empty(location.console_link()));
    }

    let confirmed: HashSet<String> = list_migrated_ids(store, location).await?;
    let catalog: Vec<MeetingRecord> = source.list_recordings(session).await?;
    let by_id: HashMap<&str, &MeetingRecord> =
        catalog.iter().map(|m| (m.id.as_str(), m)).collect();
    let record_for = |id: &str| -> MeetingRecord {
        by_id
            .get(id)
            .map(|m| (*m).clone())
            .unwrap_or_else(|| MeetingRecord::id_only(id))
    };

    let (migrated_ids, failed_ids) = partition_batch(requested, report, &confirmed);

    let failed: Vec<FailedItem> = failed_ids
        .into_iter()
        .map(|(id, reason)| {
            if matches!(reason, FailureReason::NotConfirmed) {
                log::warn!(
                    "Recording {} reported as transferred but is missing from the target store",
                    id
                );
            }
            FailedItem {
                record: record_for(&id),
                reason,
            }
        })
        .collect();

    let mut migrated: Vec<MigratedItem> = Vec::with_capacity(migrated_ids.len());
    for id in migrated_ids {
        let cleanup: SourceCleanup = match source.delete_recording(session, &id).await {
            Ok(()) => {
                log::info!("Successfully deleted recording {} from the source", id);
                SourceCleanup::Deleted
            }
            Err(e) => {
                log::warn!(
                    "Recording {} is in the target store but was kept in the source: {}",
                    id,
                    e
                );
                SourceCleanup::Kept {
                    reason: e.to_string(),
                }
            }
        };
        migrated.push(MigratedItem {
            record: record_for(&id),
            cleanup,
        });
    }

    log::info!(
        "Migration finished: {} migrated, {} failed",
        migrated.len(),
        failed.len()
    );

    Ok(MigrationResult {
        migrated,
        failed,
        store_link: location.console_link(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{TransferFailure, TransferFailureCause};

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn set(values: &[&str]) -> HashSet<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_partition_requires_both_signals() {
        let requested: Vec<String> = ids(&["m1", "m2", "m3", "m4"]);
        let report = TransferReport {
            attempted: 4,
            failures: vec![TransferFailure::new(
                "m2",
                TransferFailureCause::TimedOut { after_secs: 1 },
            )],
        };
        // m2 is listed even though its transfer failed (e.g., an older copy).
        let confirmed: HashSet<String> = set(&["m1", "m2", "m3"]);

        let (migrated, failed) = partition_batch(&requested, &report, &confirmed);

        assert_eq!(migrated, ids(&["m1", "m3"]));
        let failed_ids: Vec<&str> = failed.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(failed_ids, vec!["m2", "m4"]);
        assert!(matches!(failed[0].1, FailureReason::TransferFailed(_)));
        assert!(matches!(failed[1].1, FailureReason::NotConfirmed));
    }

    #[test]
    fn test_partition_covers_every_requested_id() {
        let requested: Vec<String> = ids(&["a", "b", "c", "d", "e"]);
        let report = TransferReport {
            attempted: 5,
            failures: vec![
                TransferFailure::new("b", TransferFailureCause::Cancelled),
                TransferFailure::new("e", TransferFailureCause::Cancelled),
            ],
        };
        let confirmed: HashSet<String> = set(&["a", "e", "zzz"]);

        let (migrated, failed) = partition_batch(&requested, &report, &confirmed);

        let mut all: Vec<String> = migrated.clone();
        all.extend(failed.iter().map(|(id, _)| id.clone()));
        all.sort();
        assert_eq!(all, requested);
        assert!(migrated.iter().all(|id| !failed.iter().any(|(f, _)| f == id)));
    }

    #[test]
    fn test_partition_empty_batch() {
        let (migrated, failed) =
            partition_batch(&[], &TransferReport::default(), &set(&["m1"]));
        assert!(migrated.is_empty());
        assert!(failed.is_empty());
    }
}
