//! Test helpers shared by the storage integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use cwlstash_storage::{Storage, StorageBackend, StorageError, StorageResult};
use futures::stream::{self, BoxStream, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// A recorded `put_file` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutCall {
    pub bucket: String,
    pub key: String,
    pub local_path: PathBuf,
}

/// In-memory backend that serves a fixed set of buckets and records uploads.
#[derive(Default)]
pub struct RecordingStorage {
    buckets: Vec<(String, Vec<String>)>,
    failing_bucket: Option<String>,
    list_bucket_calls: AtomicUsize,
    puts: Mutex<Vec<PutCall>>,
}

impl RecordingStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bucket(mut self, name: &str, keys: &[&str]) -> Self {
        self.buckets
            .push((name.to_string(), keys.iter().map(|k| k.to_string()).collect()));
        self
    }

    /// Listing this bucket yields its keys and then an error.
    pub fn failing_on(mut self, name: &str) -> Self {
        self.failing_bucket = Some(name.to_string());
        self
    }

    pub fn puts(&self) -> Vec<PutCall> {
        self.puts.lock().unwrap().clone()
    }

    pub fn list_bucket_calls(&self) -> usize {
        self.list_bucket_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Storage for RecordingStorage {
    async fn list_buckets(&self) -> StorageResult<Vec<String>> {
        self.list_bucket_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.buckets.iter().map(|(name, _)| name.clone()).collect())
    }

    fn list_objects(&self, bucket: String) -> BoxStream<'_, StorageResult<String>> {
        let keys: Vec<StorageResult<String>> = self
            .buckets
            .iter()
            .find(|(name, _)| *name == bucket)
            .map(|(_, keys)| keys.iter().cloned().map(Ok).collect())
            .unwrap_or_else(|| vec![Err(StorageError::BucketNotFound(bucket.clone()))]);

        let tail = if self.failing_bucket.as_deref() == Some(bucket.as_str()) {
            vec![Err(StorageError::ListFailed(format!(
                "listing {} interrupted",
                bucket
            )))]
        } else {
            Vec::new()
        };

        stream::iter(keys.into_iter().chain(tail)).boxed()
    }

    async fn put_file(&self, bucket: &str, key: &str, local_path: &Path) -> StorageResult<()> {
        if !self.buckets.iter().any(|(name, _)| name == bucket) {
            return Err(StorageError::BucketNotFound(bucket.to_string()));
        }
        self.puts.lock().unwrap().push(PutCall {
            bucket: bucket.to_string(),
            key: key.to_string(),
            local_path: local_path.to_path_buf(),
        });
        Ok(())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}

/// Write `contents` to `name` inside `dir` and return the path.
pub fn write_file(dir: &Path, name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("Failed to write test file");
    path
}
