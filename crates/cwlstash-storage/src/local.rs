use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// Local filesystem storage implementation
///
/// Each top-level directory under `base_path` is a bucket; object keys are
/// `/`-separated paths relative to their bucket directory. Buckets are not
/// created on upload, mirroring S3.
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory holding one sub-directory per bucket
    ///   (e.g., "/var/lib/cwlstash")
    pub async fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn bucket_path(&self, bucket: &str) -> StorageResult<PathBuf> {
        if bucket.is_empty()
            || bucket.starts_with('.')
            || bucket.contains('/')
            || bucket.contains('\\')
        {
            return Err(StorageError::InvalidKey(format!(
                "Invalid bucket name: {}",
                bucket
            )));
        }
        Ok(self.base_path.join(bucket))
    }

    /// Convert a bucket/key pair to a filesystem path with security validation
    ///
    /// Rejects keys that could escape the bucket directory.
    fn key_to_path(&self, bucket_dir: &Path, key: &str) -> StorageResult<PathBuf> {
        let escapes = Path::new(key).components().any(|c| {
            matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_))
        });
        if key.is_empty() || escapes {
            return Err(StorageError::InvalidKey(format!(
                "Storage key contains invalid characters: {}",
                key
            )));
        }

        let path = bucket_dir.join(key);

        // Symlinked directories inside a bucket must not lead outside it
        if let (Ok(canonical), Ok(base_canonical)) =
            (path.canonicalize(), bucket_dir.canonicalize())
        {
            if canonical.strip_prefix(&base_canonical).is_err() {
                return Err(StorageError::InvalidKey(
                    "Storage key resolves outside storage directory".to_string(),
                ));
            }
        }

        Ok(path)
    }

    async fn ensure_bucket(&self, bucket: &str) -> StorageResult<PathBuf> {
        let dir = self.bucket_path(bucket)?;
        match fs::metadata(&dir).await {
            Ok(meta) if meta.is_dir() => Ok(dir),
            Ok(_) => Err(StorageError::BucketNotFound(bucket.to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StorageError::BucketNotFound(bucket.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    async fn collect_keys(&self, bucket: &str) -> StorageResult<Vec<String>> {
        let root = self.ensure_bucket(bucket).await?;

        let mut keys = Vec::new();
        let mut pending = vec![root.clone()];

        while let Some(dir) = pending.pop() {
            let mut entries = fs::read_dir(&dir).await?;
            while let Some(entry) = entries.next_entry().await? {
                let file_type = entry.file_type().await?;
                let path = entry.path();
                if file_type.is_dir() {
                    pending.push(path);
                } else if file_type.is_file() {
                    let relative = path.strip_prefix(&root).map_err(|_| {
                        StorageError::InvalidKey(format!(
                            "{} is outside bucket {}",
                            path.display(),
                            bucket
                        ))
                    })?;
                    let key = relative
                        .components()
                        .map(|c| c.as_os_str().to_string_lossy())
                        .collect::<Vec<_>>()
                        .join("/");
                    keys.push(key);
                }
            }
        }

        // S3 returns keys in lexicographic order
        keys.sort();
        Ok(keys)
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn list_buckets(&self) -> StorageResult<Vec<String>> {
        let mut buckets = Vec::new();
        let mut entries = fs::read_dir(&self.base_path).await.map_err(|e| {
            StorageError::ListFailed(format!(
                "Failed to read storage directory {}: {}",
                self.base_path.display(),
                e
            ))
        })?;

        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.starts_with('.') {
                buckets.push(name);
            }
        }

        buckets.sort();
        Ok(buckets)
    }

    fn list_objects(&self, bucket: String) -> BoxStream<'_, StorageResult<String>> {
        stream::once(async move { self.collect_keys(&bucket).await })
            .map_ok(|keys| stream::iter(keys.into_iter().map(Ok::<String, StorageError>)))
            .try_flatten()
            .boxed()
    }

    async fn put_file(&self, bucket: &str, key: &str, local_path: &Path) -> StorageResult<()> {
        let start = std::time::Instant::now();
        let bucket_dir = self.ensure_bucket(bucket).await?;
        let dest = self.key_to_path(&bucket_dir, key)?;

        self.ensure_parent_dir(&dest).await?;

        let size = fs::copy(local_path, &dest).await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                StorageError::FileNotFound(local_path.to_path_buf())
            } else {
                tracing::error!(
                    error = %e,
                    bucket = %bucket,
                    key = %key,
                    "Local upload failed"
                );
                StorageError::UploadFailed(e.to_string())
            }
        })?;

        tracing::info!(
            bucket = %bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local upload successful"
        );

        Ok(())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
