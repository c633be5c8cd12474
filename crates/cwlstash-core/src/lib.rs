//! cwlstash Core Library
//!
//! This crate provides the configuration record, domain models and error types
//! shared by the storage facade and the command-line tools.

pub mod config;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{parse_flag, parse_legacy_secure_flag, Config};
pub use error::ManifestError;
pub use models::{BucketObjectRef, FileOutput, Manifest, ManifestEntry};
pub use storage_types::StorageBackend;
// Note: Storage, StorageError, StorageResult live in cwlstash-storage
