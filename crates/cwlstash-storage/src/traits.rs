//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use futures::stream::BoxStream;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Listing failed: {0}")]
    ListFailed(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Bucket not found: {0}")]
    BucketNotFound(String),

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// All storage backends (S3, local filesystem) must implement this trait. The
/// `StorageClient` facade is written against it, so enumeration and upload
/// behave the same on every backend.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Names of every bucket visible to the configured credentials, in the
    /// order the backend reports them.
    async fn list_buckets(&self) -> StorageResult<Vec<String>>;

    /// Every object key in `bucket`, in backend order.
    ///
    /// The stream is lazy: nothing is requested until it is polled, and
    /// pagination is handled internally.
    fn list_objects(&self, bucket: String) -> BoxStream<'_, StorageResult<String>>;

    /// Store the full contents of `local_path` under `key` in `bucket`.
    ///
    /// An existing object with the same key is overwritten. Returns
    /// `BucketNotFound` when the bucket does not exist.
    async fn put_file(&self, bucket: &str, key: &str, local_path: &Path) -> StorageResult<()>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
