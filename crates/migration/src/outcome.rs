//! Batch outcome types.
//!
//! Each requested meeting ends in exactly one terminal state:
//!
//! | Transfer | Target listing | Source        | Reported as                    |
//! |----------|----------------|---------------|--------------------------------|
//! | failed   | any            | kept          | `failed` / `TransferFailed`    |
//! | ok       | absent         | kept          | `failed` / `NotConfirmed`      |
//! | ok       | present        | deleted       | `migrated` / `Deleted`         |
//! | ok       | present        | delete failed | `migrated` / `Kept`            |

use std::collections::{HashMap, HashSet};
use std::fmt;

use recording_migrator_source::MeetingRecord;

use crate::error::{TransferFailure, TransferFailureCause};

/// Result of the transfer phase alone, before reconciliation.
#[derive(Debug, Clone, Default)]
pub struct TransferReport {
    /// Items whose transfer was started.
    pub attempted: usize,
    /// Per-item failures, in request order.
    pub failures: Vec<TransferFailure>,
}

impl TransferReport {
    /// Failure log indexed by meeting id.
    pub fn failures_by_id(&self) -> HashMap<&str, &TransferFailure> {
        self.failures
            .iter()
            .map(|f| (f.meeting_id.as_str(), f))
            .collect()
    }
}

/// What happened to the source copy of a migrated recording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceCleanup {
    /// Removed from the source.
    Deleted,
    /// Deletion failed; the recording now exists in both places.
    Kept { reason: String },
}

/// A recording confirmed present in the target store.
#[derive(Debug, Clone)]
pub struct MigratedItem {
    pub record: MeetingRecord,
    pub cleanup: SourceCleanup,
}

/// Why a requested recording is not counted as migrated.
#[derive(Debug, Clone)]
pub enum FailureReason {
    /// The transfer itself failed.
    TransferFailed(TransferFailureCause),
    /// The transfer reported success but the object is missing from the store.
    NotConfirmed,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::TransferFailed(cause) => write!(f, "transfer failed: {}", cause),
            FailureReason::NotConfirmed => f.write_str("not found in target store after transfer"),
        }
    }
}

/// A requested recording that stays only in the source.
#[derive(Debug, Clone)]
pub struct FailedItem {
    pub record: MeetingRecord,
    pub reason: FailureReason,
}

/// Outcome of one migration run.
#[derive(Debug, Clone)]
pub struct MigrationResult {
    /// Confirmed in the target store.
    pub migrated: Vec<MigratedItem>,
    /// Not confirmed; never deleted from the source.
    pub failed: Vec<FailedItem>,
    /// Where the operator can inspect the target store.
    pub store_link: String,
}

impl MigrationResult {
    /// Result of an empty batch.
    pub fn empty(store_link: impl Into<String>) -> Self {
        Self {
            migrated: Vec::new(),
            failed: Vec::new(),
            store_link: store_link.into(),
        }
    }

    pub fn migrated_ids(&self) -> impl Iterator<Item = &str> {
        self.migrated.iter().map(|m| m.record.id.as_str())
    }

    pub fn failed_ids(&self) -> impl Iterator<Item = &str> {
        self.failed.iter().map(|f| f.record.id.as_str())
    }

    /// Ids whose source deletion was skipped because an earlier step failed.
    pub fn deletion_skipped(&self) -> impl Iterator<Item = &str> {
        self.failed_ids()
    }

    /// Migrated recordings that remain in the source because deletion failed.
    pub fn kept_in_source(&self) -> impl Iterator<Item = &MigratedItem> {
        self.migrated
            .iter()
            .filter(|m| matches!(m.cleanup, SourceCleanup::Kept { .. }))
    }
}

/// Drop repeated ids, keeping the first occurrence.
pub fn dedupe_preserving_order(ids: &[String]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(ids.len());
    ids.iter()
        .filter(|id| seen.insert(id.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedupe_preserving_order() {
        let ids: Vec<String> = ["m2", "m1", "m2", "m3", "m1"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(dedupe_preserving_order(&ids), vec!["m2", "m1", "m3"]);
    }

    #[test]
    fn test_report_failure_lookup() {
        let report = TransferReport {
            attempted: 2,
            failures: vec![TransferFailure::new("m2", TransferFailureCause::Cancelled)],
        };
        let by_id: HashMap<&str, &TransferFailure> = report.failures_by_id();
        assert!(by_id.contains_key("m2"));
        assert!(!by_id.contains_key("m1"));
    }

    #[test]
    fn test_result_views() {
        let result = MigrationResult {
            migrated: vec![
                MigratedItem {
                    record: MeetingRecord::id_only("m1"),
                    cleanup: SourceCleanup::Deleted,
                },
                MigratedItem {
                    record: MeetingRecord::id_only("m3"),
                    cleanup: SourceCleanup::Kept {
                        reason: "503".into(),
                    },
                },
            ],
            failed: vec![FailedItem {
                record: MeetingRecord::id_only("m2"),
                reason: FailureReason::NotConfirmed,
            }],
            store_link: String::new(),
        };

        assert_eq!(result.migrated_ids().collect::<Vec<_>>(), vec!["m1", "m3"]);
        assert_eq!(result.deletion_skipped().collect::<Vec<_>>(), vec!["m2"]);
        assert_eq!(result.kept_in_source().count(), 1);
    }
}
