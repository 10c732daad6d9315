//! Shared constants used across recording-migrator crates.

/// Separator between topic and meeting id in target object keys.
/// Topics must never contain it.
pub const KEY_SEPARATOR: &str = "---";

/// Extension given to migrated recordings.
pub const RECORDING_EXTENSION: &str = "mp4";

/// Content type set on migrated recording objects.
pub const RECORDING_CONTENT_TYPE: &str = "video/mp4";

/// Default number of recordings transferred concurrently.
pub const DEFAULT_MIGRATION_CONCURRENCY: usize = 4;

/// Default upper bound for a single recording transfer (30 minutes).
pub const DEFAULT_ITEM_TIMEOUT_SECS: u64 = 30 * 60;

/// Default base URL of the Webex REST API.
pub const DEFAULT_WEBEX_BASE_URL: &str = "https://webexapis.com/v1";

/// Page size requested when listing recordings.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Timeout for catalog API calls. Downloads are bounded by the item timeout instead.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
