//! Storage traits/interfaces for object store operations.

use async_trait::async_trait;

use crate::error::StorageError;
use crate::types::ObjectBody;

/// Information about an object from list operations.
#[derive(Debug, Clone)]
pub struct ObjectInfo {
    /// Object key.
    pub key: String,
    /// Object size in bytes.
    pub size: u64,
    /// Last modified timestamp (Unix epoch seconds).
    pub last_modified: Option<i64>,
}

/// Object store operations needed by the migration - implemented by each backend.
#[async_trait]
pub trait StorageClient: Send + Sync {
    /// List every object under a prefix, following pagination to the end.
    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
    ) -> Result<Vec<ObjectInfo>, StorageError>;

    /// Upload a streamed body.
    ///
    /// The body is consumed as it arrives; implementations must not collect it
    /// into memory.
    async fn put_object_stream(
        &self,
        bucket: &str,
        key: &str,
        body: ObjectBody,
        content_type: Option<&str>,
    ) -> Result<(), StorageError>;
}
