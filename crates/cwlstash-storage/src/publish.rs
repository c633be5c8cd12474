//! Upload the `File` outputs of a workflow manifest.

use crate::client::StorageClient;
use crate::traits::StorageResult;
use cwlstash_core::Manifest;
use std::path::PathBuf;

/// Record of one completed manifest upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub name: String,
    pub path: PathBuf,
    pub bucket: String,
    pub key: String,
}

/// Upload every `File` entry of `manifest` to `bucket`, keyed by its basename.
///
/// Entries are uploaded one at a time in manifest order. The first failure
/// aborts the remaining uploads and is returned as-is.
pub async fn publish_manifest(
    client: &StorageClient,
    manifest: &Manifest,
    bucket: &str,
) -> StorageResult<Vec<UploadedFile>> {
    let mut uploaded = Vec::with_capacity(manifest.files().len());

    for file in manifest.files() {
        tracing::info!(
            output = %file.name,
            path = %file.path.display(),
            bucket = %bucket,
            key = %file.basename,
            "Uploading file"
        );

        client.upload_file(&file.path, bucket, &file.basename).await?;

        uploaded.push(UploadedFile {
            name: file.name.clone(),
            path: file.path.clone(),
            bucket: bucket.to_string(),
            key: file.basename.clone(),
        });
    }

    if manifest.skipped() > 0 {
        tracing::debug!(
            skipped = manifest.skipped(),
            "Skipped manifest entries that are not files"
        );
    }

    Ok(uploaded)
}
