//! Target store reconciliation.
//!
//! Derives which source meetings already exist in the target store by parsing
//! object keys, and annotates catalog listings with that knowledge.

use std::collections::HashSet;

use recording_migrator_source::MeetingRecord;
use recording_migrator_storage::{ObjectInfo, ObjectKey, StorageClient, StorageError, StoreLocation};
use serde::Serialize;

/// A catalog entry with its migration status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotatedMeeting {
    #[serde(flatten)]
    pub record: MeetingRecord,
    pub already_in_target: bool,
}

/// List the meeting ids present in the target store.
///
/// Objects whose keys do not follow the object key format are skipped with a
/// log line; one stray object never fails reconciliation.
///
/// # Arguments
/// * `client` - Storage client for the target store
/// * `location` - Bucket and prefix holding migrated recordings
pub async fn list_migrated_ids<C>(
    client: &C,
    location: &StoreLocation,
) -> Result<HashSet<String>, StorageError>
where
    C: StorageClient + ?Sized,
{
    let objects: Vec<ObjectInfo> = client
        .list_objects(&location.bucket, &location.list_prefix())
        .await?;
    Ok(migrated_ids_from_objects(location, &objects))
}

/// Extract meeting ids from listed objects.
pub fn migrated_ids_from_objects(location: &StoreLocation, objects: &[ObjectInfo]) -> HashSet<String> {
    let mut ids: HashSet<String> = HashSet::with_capacity(objects.len());

    for object in objects {
        let Some(relative) = location.relative_key(&object.key) else {
            log::info!("Ignoring object outside prefix: {}", object.key);
            continue;
        };
        match ObjectKey::parse(relative) {
            Ok(key) => {
                ids.insert(key.meeting_id().to_string());
            }
            Err(e) => log::info!("Found a recording in the target store in the wrong format: {}", e),
        }
    }

    ids
}

/// Mark each meeting with whether it is already in the target store.
///
/// Returns a new collection; the input is left untouched.
pub fn annotate(meetings: &[MeetingRecord], migrated_ids: &HashSet<String>) -> Vec<AnnotatedMeeting> {
    meetings
        .iter()
        .map(|m| AnnotatedMeeting {
            record: m.clone(),
            already_in_target: migrated_ids.contains(&m.id),
        })
        .collect()
}
