//! Storage abstraction for the recording migration target.
//!
//! This crate provides a backend-agnostic interface for listing and streaming
//! objects into the target store, plus the object key format that links each
//! stored recording back to its source meeting:
//!
//! - **`StorageClient`** - list and streaming put, implemented by each backend
//! - **`ObjectKey`** - `{topic}---{meeting_id}.{extension}` build/parse
//! - **`StoreLocation`** - bucket, region and prefix of migrated recordings

mod error;
pub mod object_key;
mod traits;
mod types;

pub use error::StorageError;
pub use object_key::{sanitize_topic, KeyParseError, ObjectKey};
pub use traits::{ObjectInfo, StorageClient};
pub use types::{AwsCredentials, ObjectBody, StorageSettings, StoreLocation};
