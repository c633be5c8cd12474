//! Shared plumbing for the cwlstash binaries.

use anyhow::Context;
use cwlstash_core::{BucketObjectRef, Config, Manifest};
use cwlstash_storage::{publish_manifest, StorageClient, UploadedFile};
use std::io::{ErrorKind, Write};
use std::path::Path;

/// Output format for object listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One `bucket key` line per object
    #[default]
    Plain,
    /// Pretty-printed JSON array
    Json,
}

/// Render a listing. Plain output ends every line with a newline.
pub fn render_objects(refs: &[BucketObjectRef], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Plain => Ok(refs.iter().map(|r| format!("{}\n", r)).collect()),
        OutputFormat::Json => {
            let mut out = serde_json::to_string_pretty(refs).context("Serialize listing")?;
            out.push('\n');
            Ok(out)
        }
    }
}

/// Write a rendered listing to `out`.
///
/// A reader that goes away early (`list_objects | head`) is not an error.
pub fn write_objects<W: Write>(
    out: &mut W,
    refs: &[BucketObjectRef],
    format: OutputFormat,
) -> anyhow::Result<()> {
    let rendered = render_objects(refs, format)?;
    match out.write_all(rendered.as_bytes()).and_then(|()| out.flush()) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::BrokenPipe => Ok(()),
        Err(e) => Err(e).context("Failed to write listing"),
    }
}

/// List every object in every bucket and print it to stdout.
pub async fn list_objects(config: &Config, format: OutputFormat) -> anyhow::Result<()> {
    let client = StorageClient::connect(config)
        .await
        .context("Failed to connect to storage")?;

    let refs = client
        .list_all_objects()
        .await
        .with_context(|| format!("Failed to list objects on {}", config.endpoint_url))?;

    write_objects(&mut std::io::stdout().lock(), &refs, format)
}

/// Upload the `File` outputs named in the manifest at `manifest_path` to the
/// configured bucket.
///
/// The manifest is read and validated before any connection is made.
pub async fn send_cwl_output(
    config: &Config,
    manifest_path: &Path,
) -> anyhow::Result<Vec<UploadedFile>> {
    let manifest = Manifest::load(manifest_path)
        .with_context(|| format!("Failed to load manifest {}", manifest_path.display()))?;

    let client = StorageClient::connect(config)
        .await
        .context("Failed to connect to storage")?;

    let uploaded = publish_manifest(&client, &manifest, &config.bucket)
        .await
        .with_context(|| format!("Failed to upload outputs to bucket {}", config.bucket))?;

    tracing::info!(
        bucket = %config.bucket,
        uploaded = uploaded.len(),
        skipped = manifest.skipped(),
        "Manifest outputs uploaded"
    );

    Ok(uploaded)
}

/// Initialize tracing for CLI binaries.
///
/// Logs go to stderr so listings on stdout stay pipeable.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
