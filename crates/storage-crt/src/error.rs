//! Mapping of AWS SDK failures onto `StorageError`.

use std::error::Error as StdError;

use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use recording_migrator_storage::StorageError;

/// Error codes that mean the configured credentials cannot do the operation.
const ACCESS_DENIED_CODES: &[&str] = &[
    "AccessDenied",
    "InvalidAccessKeyId",
    "SignatureDoesNotMatch",
    "ExpiredToken",
    "InvalidToken",
];

/// Classify an SDK error for an operation on `bucket`/`key`.
///
/// # Arguments
/// * `err` - Error returned by `send()`
/// * `bucket` - Bucket the request targeted
/// * `key` - Object key or prefix the request targeted
pub(crate) fn classify_sdk_error<E, R>(err: SdkError<E, R>, bucket: &str, key: &str) -> StorageError
where
    E: ProvideErrorMetadata + StdError + Send + Sync + 'static,
    R: std::fmt::Debug,
{
    let code: Option<String> = err.code().map(str::to_string);
    let message: String = DisplayErrorContext(&err).to_string();

    match code.as_deref() {
        Some(c) if ACCESS_DENIED_CODES.contains(&c) => StorageError::AccessDenied {
            bucket: bucket.to_string(),
            key: key.to_string(),
            message,
        },
        Some("NoSuchBucket") | Some("NoSuchKey") => StorageError::NotFound {
            bucket: bucket.to_string(),
            key: key.to_string(),
        },
        _ => StorageError::NetworkError { message },
    }
}
