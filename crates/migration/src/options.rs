//! Options for migration runs.

use std::time::Duration;

use recording_migrator_common::{
    DEFAULT_ITEM_TIMEOUT_SECS, DEFAULT_MIGRATION_CONCURRENCY, RECORDING_CONTENT_TYPE,
    RECORDING_EXTENSION,
};

/// Options for transfer batches.
#[derive(Debug, Clone)]
pub struct MigrationOptions {
    /// Maximum recordings in flight at once.
    pub max_concurrency: usize,
    /// Upper bound for one recording's metadata lookup plus transfer.
    pub item_timeout: Duration,
    /// Extension for target object keys.
    pub extension: String,
    /// Content type set on uploaded objects.
    pub content_type: String,
}

impl Default for MigrationOptions {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MIGRATION_CONCURRENCY,
            item_timeout: Duration::from_secs(DEFAULT_ITEM_TIMEOUT_SECS),
            extension: RECORDING_EXTENSION.to_string(),
            content_type: RECORDING_CONTENT_TYPE.to_string(),
        }
    }
}

impl MigrationOptions {
    /// Create options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum concurrency. Zero is treated as one.
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    /// Set the per-item timeout.
    pub fn with_item_timeout(mut self, item_timeout: Duration) -> Self {
        self.item_timeout = item_timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migration_options_default() {
        let options = MigrationOptions::default();
        assert_eq!(options.max_concurrency, DEFAULT_MIGRATION_CONCURRENCY);
        assert_eq!(options.item_timeout, Duration::from_secs(30 * 60));
        assert_eq!(options.extension, "mp4");
        assert_eq!(options.content_type, "video/mp4");
    }

    #[test]
    fn test_migration_options_builders() {
        let options = MigrationOptions::new()
            .with_max_concurrency(8)
            .with_item_timeout(Duration::from_secs(5));
        assert_eq!(options.max_concurrency, 8);
        assert_eq!(options.item_timeout, Duration::from_secs(5));
    }
}
