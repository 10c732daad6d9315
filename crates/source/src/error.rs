//! Error types for source catalog operations.

use thiserror::Error;

/// Errors returned by the source catalog.
#[derive(Error, Debug, Clone)]
pub enum SourceError {
    /// Credential expired or invalid. The operator must re-authenticate.
    #[error("Source credential rejected on {endpoint}: {message}")]
    Unauthorized { endpoint: String, message: String },

    /// Non-success status from the source API.
    #[error("Source API error {status} on {endpoint}: {message}")]
    Api {
        endpoint: String,
        status: u16,
        message: String,
    },

    /// Transport failure (connect, TLS, interrupted body).
    #[error("Network error on {endpoint}: {message}")]
    Network { endpoint: String, message: String },

    /// Response body could not be decoded.
    #[error("Failed to decode response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    /// Response decoded but an expected field was absent.
    #[error("Response from {endpoint} is missing '{field}'")]
    MissingField {
        endpoint: String,
        field: &'static str,
    },

    /// Identifier that cannot name a single API resource.
    #[error("Invalid resource identifier '{id}'")]
    InvalidIdentifier { id: String },

    /// Invalid client configuration or query.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl SourceError {
    /// Check if this error requires a fresh credential.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, SourceError::Unauthorized { .. })
    }
}
