//! AWS SDK S3 client implementation.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use futures::TryStreamExt;
use http_body::Frame;
use http_body_util::StreamBody;
use sync_wrapper::SyncStream;

use recording_migrator_storage::{
    ObjectBody, ObjectInfo, StorageClient, StorageError, StorageSettings,
};

use crate::error::classify_sdk_error;

/// StorageClient implementation using AWS SDK for Rust.
///
/// Uploads stream the body straight into `PutObject`; nothing is staged on disk
/// or collected in memory.
pub struct CrtStorageClient {
    /// The underlying S3 client.
    s3_client: S3Client,
}

impl CrtStorageClient {
    /// Create a new storage client.
    ///
    /// Explicit credentials in `settings` win; otherwise the default AWS
    /// credential chain is used.
    ///
    /// # Arguments
    /// * `settings` - Storage settings including region and optional credentials
    pub async fn new(settings: StorageSettings) -> Result<Self, StorageError> {
        if settings.region.trim().is_empty() {
            return Err(StorageError::InvalidConfig {
                message: "region must not be empty".to_string(),
            });
        }

        let config_loader = aws_config::defaults(BehaviorVersion::latest())
            .region(aws_sdk_s3::config::Region::new(settings.region.clone()));

        let config_loader = if let Some(ref creds) = settings.credentials {
            let credentials = Credentials::new(
                &creds.access_key_id,
                &creds.secret_access_key,
                creds.session_token.clone(),
                None,
                "recording-migrator",
            );
            config_loader.credentials_provider(credentials)
        } else {
            config_loader
        };

        let sdk_config = config_loader.load().await;
        let s3_client = S3Client::new(&sdk_config);

        Ok(Self { s3_client })
    }
}

#[async_trait]
impl StorageClient for CrtStorageClient {
    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
    ) -> Result<Vec<ObjectInfo>, StorageError> {
        let mut objects: Vec<ObjectInfo> = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let mut request = self
                .s3_client
                .list_objects_v2()
                .bucket(bucket)
                .prefix(prefix);

            if let Some(ref token) = continuation_token {
                request = request.continuation_token(token);
            }

            let response = request
                .send()
                .await
                .map_err(|err| classify_sdk_error(err, bucket, prefix))?;

            for obj in response.contents() {
                let last_modified: Option<i64> = obj
                    .last_modified()
                    .and_then(|dt| dt.to_millis().ok())
                    .map(|ms| ms / 1000);

                objects.push(ObjectInfo {
                    key: obj.key().unwrap_or_default().to_string(),
                    size: obj.size().map(|s| s as u64).unwrap_or(0),
                    last_modified,
                });
            }

            if response.is_truncated() == Some(true) {
                continuation_token = response.next_continuation_token().map(str::to_string);
                if continuation_token.is_none() {
                    log::warn!("Truncated listing of s3://{}/{} without a token", bucket, prefix);
                    break;
                }
            } else {
                break;
            }
        }

        log::debug!("Listed {} object(s) in s3://{}/{}", objects.len(), bucket, prefix);
        Ok(objects)
    }

    async fn put_object_stream(
        &self,
        bucket: &str,
        key: &str,
        body: ObjectBody,
        content_type: Option<&str>,
    ) -> Result<(), StorageError> {
        let ObjectBody {
            content_length,
            stream,
        } = body;

        // PutObject needs Content-Length for a body it cannot rewind.
        let length: u64 = content_length.ok_or_else(|| StorageError::MissingContentLength {
            key: key.to_string(),
        })?;

        let frames = stream.map_ok(Frame::data);
        let byte_stream = ByteStream::from_body_1_x(StreamBody::new(SyncStream::new(frames)));

        let mut request = self
            .s3_client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_length(length as i64)
            .body(byte_stream);

        if let Some(ct) = content_type {
            request = request.content_type(ct);
        }

        request
            .send()
            .await
            .map_err(|err| classify_sdk_error(err, bucket, key))?;

        log::debug!("Uploaded {} bytes to s3://{}/{}", length, bucket, key);
        Ok(())
    }
}
