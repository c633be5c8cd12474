//! cwlstash Storage Library
//!
//! This crate provides the storage abstraction used by the cwlstash tools: the
//! `Storage` trait, an S3 backend for any S3-compatible endpoint, a local
//! filesystem backend, and the `StorageClient` facade that lists every object
//! across every bucket and uploads local files.
//!
//! # Key format
//!
//! Object keys are passed through unchanged. The local backend additionally
//! rejects keys with a `..` path segment or a leading `/` so they cannot escape
//! its root.

pub mod client;
pub mod factory;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod publish;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use client::StorageClient;
pub use cwlstash_core::{BucketObjectRef, StorageBackend};
pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use publish::{publish_manifest, UploadedFile};
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
