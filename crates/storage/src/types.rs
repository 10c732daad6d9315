//! Shared data structures for storage operations.

use std::fmt;

use bytes::Bytes;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::object_key::ObjectKey;

/// Configuration settings for the object store client.
#[derive(Debug, Clone)]
pub struct StorageSettings {
    /// AWS region.
    pub region: String,
    /// Explicit credentials; the default provider chain is used when `None`.
    pub credentials: Option<AwsCredentials>,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            region: "us-east-1".into(),
            credentials: None,
        }
    }
}

/// AWS credentials.
#[derive(Clone)]
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Where migrated recordings live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreLocation {
    /// Bucket name.
    pub bucket: String,
    /// Bucket region, used for the console link.
    pub region: String,
    /// Optional key prefix (e.g., "recordings"). Empty means bucket root.
    pub prefix: String,
}

impl StoreLocation {
    /// Create a location at the bucket root.
    pub fn new(bucket: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            region: region.into(),
            prefix: String::new(),
        }
    }

    /// Place objects under a key prefix. Surrounding slashes are dropped.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into().trim_matches('/').to_string();
        self
    }

    /// Prefix to list with: "" or "{prefix}/".
    pub fn list_prefix(&self) -> String {
        if self.prefix.is_empty() {
            String::new()
        } else {
            format!("{}/", self.prefix)
        }
    }

    /// Full store key for an object key.
    /// Returns: "{prefix}/{topic}---{meeting_id}.{ext}"
    pub fn object_path(&self, key: &ObjectKey) -> String {
        format!("{}{}", self.list_prefix(), key)
    }

    /// Strip the location prefix from a listed key.
    ///
    /// Returns `None` for keys outside the prefix.
    pub fn relative_key<'k>(&self, full_key: &'k str) -> Option<&'k str> {
        full_key.strip_prefix(self.list_prefix().as_str())
    }

    /// Console link shown to the operator after a migration.
    pub fn console_link(&self) -> String {
        let mut link: String = format!(
            "https://s3.console.aws.amazon.com/s3/buckets/{}?region={}&tab=objects",
            self.bucket, self.region
        );
        if !self.prefix.is_empty() {
            link.push_str(&format!("&prefix={}/", self.prefix));
        }
        link
    }
}

/// A streamed object body.
pub struct ObjectBody {
    /// Total length in bytes, when the producer knows it.
    pub content_length: Option<u64>,
    /// Body chunks in order.
    pub stream: BoxStream<'static, Result<Bytes, StorageError>>,
}

impl ObjectBody {
    /// Wrap a chunk stream.
    pub fn new(
        content_length: Option<u64>,
        stream: BoxStream<'static, Result<Bytes, StorageError>>,
    ) -> Self {
        Self {
            content_length,
            stream,
        }
    }
}

impl fmt::Debug for ObjectBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectBody")
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_path_at_bucket_root() {
        let loc = StoreLocation::new("bucket", "eu-west-1");
        let key = ObjectKey::new("Weekly Sync", "abc123", "mp4").unwrap();
        assert_eq!(loc.object_path(&key), "Weekly Sync---abc123.mp4");
    }

    #[test]
    fn test_object_path_with_prefix() {
        let loc = StoreLocation::new("bucket", "eu-west-1").with_prefix("/recordings/");
        let key = ObjectKey::new("Weekly Sync", "abc123", "mp4").unwrap();
        assert_eq!(loc.object_path(&key), "recordings/Weekly Sync---abc123.mp4");
        assert_eq!(
            loc.relative_key("recordings/Weekly Sync---abc123.mp4"),
            Some("Weekly Sync---abc123.mp4")
        );
        assert_eq!(loc.relative_key("other/x---y.mp4"), None);
    }

    #[test]
    fn test_console_link() {
        let loc = StoreLocation::new("meetings", "us-west-2");
        assert_eq!(
            loc.console_link(),
            "https://s3.console.aws.amazon.com/s3/buckets/meetings?region=us-west-2&tab=objects"
        );
    }

    #[test]
    fn test_credentials_debug_is_redacted() {
        let creds = AwsCredentials {
            access_key_id: "AKIA".into(),
            secret_access_key: "hunter2".into(),
            session_token: Some("token".into()),
        };
        let printed: String = format!("{:?}", creds);
        assert!(!printed.contains("hunter2"));
        assert!(!printed.contains("token\""));
    }
}
