//! Error types for storage operations.

use thiserror::Error;

/// Errors that can occur during object store operations.
#[derive(Error, Debug, Clone)]
pub enum StorageError {
    /// Bucket or object not found.
    #[error("Not found: s3://{bucket}/{key}")]
    NotFound { bucket: String, key: String },

    /// Credentials rejected or missing permissions.
    #[error("Access denied to s3://{bucket}/{key}: {message}")]
    AccessDenied {
        bucket: String,
        key: String,
        message: String,
    },

    /// Streaming upload requires the body length up front.
    #[error("Content length unknown for {key}; streaming upload needs it")]
    MissingContentLength { key: String },

    /// Network or service error.
    #[error("Network error: {message}")]
    NetworkError { message: String },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl StorageError {
    /// Check if this error means the store credentials must be refreshed.
    pub fn is_access_denied(&self) -> bool {
        matches!(self, StorageError::AccessDenied { .. })
    }
}
