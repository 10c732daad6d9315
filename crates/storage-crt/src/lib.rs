//! AWS SDK S3 backend for recording-migrator storage.
//!
//! This crate provides a `StorageClient` implementation using the AWS SDK for Rust.
//!
//! # Example
//!
//! ```ignore
//! use recording_migrator_storage_crt::CrtStorageClient;
//! use recording_migrator_storage::StorageSettings;
//!
//! let client = CrtStorageClient::new(StorageSettings::default()).await?;
//! let objects = client.list_objects("my-bucket", "").await?;
//! ```

mod client;
mod error;

pub use client::CrtStorageClient;
