//! Storage client facade
//!
//! `StorageClient` wraps one storage backend and exposes the two operations the
//! command-line tools need: enumerate every object in every bucket, and upload
//! one local file under one key.

use crate::factory::create_storage;
use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;
use cwlstash_core::{BucketObjectRef, Config};
use futures::stream::{self, Stream, TryStreamExt};
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;
use tokio::fs;

#[derive(Clone)]
pub struct StorageClient {
    storage: Arc<dyn Storage>,
}

impl StorageClient {
    /// Build a client for the backend described by `config`.
    ///
    /// No request is sent; an unreachable endpoint surfaces on the first call.
    pub async fn connect(config: &Config) -> StorageResult<Self> {
        tracing::info!(
            endpoint_url = %config.endpoint_url,
            backend = %config.storage_backend,
            "Connecting to storage"
        );
        let storage = create_storage(config).await?;
        Ok(Self::new(storage))
    }

    /// Wrap an already constructed backend.
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub fn backend_type(&self) -> StorageBackend {
        self.storage.backend_type()
    }

    /// Lazily enumerate every object in every visible bucket.
    ///
    /// Buckets are visited in the order the backend lists them, keys in the
    /// order each bucket returns them. Each call starts a fresh listing.
    pub fn objects(&self) -> impl Stream<Item = StorageResult<BucketObjectRef>> + Send + '_ {
        let storage: &dyn Storage = self.storage.as_ref();

        stream::once(storage.list_buckets())
            .map_ok(|buckets| stream::iter(buckets.into_iter().map(Ok::<String, StorageError>)))
            .try_flatten()
            .map_ok(move |bucket| {
                storage
                    .list_objects(bucket.clone())
                    .map_ok(move |key| BucketObjectRef::new(bucket.clone(), key))
            })
            .try_flatten()
    }

    /// Enumerate every object in every visible bucket.
    ///
    /// Fails on the first listing error; refs gathered before it are dropped.
    pub async fn list_all_objects(&self) -> StorageResult<Vec<BucketObjectRef>> {
        let start = std::time::Instant::now();
        let refs: Vec<BucketObjectRef> = self.objects().try_collect().await?;

        tracing::info!(
            object_count = refs.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Listed all objects"
        );

        Ok(refs)
    }

    /// Upload the file at `local_path` to `bucket` under `key`.
    ///
    /// A missing source file is reported as `FileNotFound` before the backend
    /// is contacted. Uploading to an existing key overwrites it.
    pub async fn upload_file(
        &self,
        local_path: impl AsRef<Path>,
        bucket: &str,
        key: &str,
    ) -> StorageResult<()> {
        let local_path = local_path.as_ref();

        match fs::metadata(local_path).await {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => {
                return Err(StorageError::UploadFailed(format!(
                    "{} is not a regular file",
                    local_path.display()
                )))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StorageError::FileNotFound(local_path.to_path_buf()))
            }
            Err(e) => return Err(e.into()),
        }

        self.storage.put_file(bucket, key, local_path).await
    }
}
