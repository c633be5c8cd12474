use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use aws_config::retry::RetryConfig;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use cwlstash_core::Config;
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use std::error::Error as StdError;
use std::fmt::Debug;
use std::path::Path;

/// S3 storage implementation for AWS and S3-compatible endpoints (MinIO, Ceph RGW, ...)
#[derive(Clone)]
pub struct S3Storage {
    client: Client,
    endpoint_url: String,
}

impl S3Storage {
    /// Create a new S3Storage bound to the endpoint and credentials in `config`.
    ///
    /// Fails with `Connection` when the endpoint URL is malformed or a credential
    /// is empty. No request is sent; reachability is discovered on first use.
    /// The endpoint scheme is forced to agree with `use_tls`.
    pub async fn new(config: &Config) -> StorageResult<Self> {
        validate_endpoint(&config.endpoint_url)?;
        let endpoint_url = endpoint_for_tls(&config.endpoint_url, config.use_tls);

        if config.access_key.is_empty() || config.secret_key.is_empty() {
            return Err(StorageError::Connection(
                "Access key and secret key must not be empty".to_string(),
            ));
        }

        let credentials = Credentials::new(
            &config.access_key,
            &config.secret_key,
            None,
            None,
            "cwlstash",
        );

        // Calls are single-shot; the SDK's own retry layer is switched off.
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .endpoint_url(&endpoint_url)
            .credentials_provider(credentials)
            .retry_config(RetryConfig::disabled())
            .load()
            .await;

        // Path-style addressing is required by MinIO and most self-hosted stores
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(true)
            .build();

        tracing::info!(
            endpoint_url = %endpoint_url,
            region = %config.region,
            use_tls = config.use_tls,
            "S3 client configured"
        );

        Ok(S3Storage {
            client: Client::from_conf(s3_config),
            endpoint_url,
        })
    }

    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }
}

/// Check that `endpoint` is an `http(s)://host[:port][/path]` URL.
fn validate_endpoint(endpoint: &str) -> StorageResult<()> {
    let rest = endpoint
        .strip_prefix("http://")
        .or_else(|| endpoint.strip_prefix("https://"))
        .ok_or_else(|| {
            StorageError::Connection(format!(
                "Endpoint URL must start with http:// or https://: {}",
                endpoint
            ))
        })?;

    let authority = rest.split('/').next().unwrap_or_default();
    let (host, port) = if authority.ends_with(']') {
        (authority, None)
    } else {
        match authority.rsplit_once(':') {
            Some((host, port)) => (host, Some(port)),
            None => (authority, None),
        }
    };

    if host.is_empty() {
        return Err(StorageError::Connection(format!(
            "Endpoint URL has no host: {}",
            endpoint
        )));
    }

    if let Some(port) = port {
        port.parse::<u16>().map_err(|_| {
            StorageError::Connection(format!("Endpoint URL has an invalid port: {}", endpoint))
        })?;
    }

    Ok(())
}

/// Rewrite the scheme of a validated endpoint so it matches `use_tls`.
fn endpoint_for_tls(endpoint: &str, use_tls: bool) -> String {
    let (scheme, rest) = match endpoint.split_once("://") {
        Some(parts) => parts,
        None => return endpoint.to_string(),
    };
    let wanted = if use_tls { "https" } else { "http" };
    if scheme == wanted {
        return endpoint.to_string();
    }

    let rewritten = format!("{}://{}", wanted, rest);
    tracing::warn!(
        endpoint_url = %endpoint,
        effective_endpoint_url = %rewritten,
        use_tls,
        "Endpoint scheme disagrees with use_tls; using use_tls"
    );
    rewritten
}

/// Continuation state after a ListObjectsV2 page: `None` ends the listing.
fn next_page(is_truncated: Option<bool>, token: Option<&str>) -> Option<Option<String>> {
    if is_truncated == Some(true) {
        token.map(|t| Some(t.to_string()))
    } else {
        None
    }
}

/// Map a failed S3 call onto a `StorageError`.
///
/// `otherwise` builds the error for failures that are neither a missing bucket
/// nor a transport failure.
fn classify_failure(
    code: Option<&str>,
    connection_failure: bool,
    bucket: &str,
    detail: String,
    otherwise: fn(String) -> StorageError,
) -> StorageError {
    if code == Some("NoSuchBucket") {
        StorageError::BucketNotFound(bucket.to_string())
    } else if connection_failure {
        StorageError::Connection(detail)
    } else {
        otherwise(detail)
    }
}

fn is_connection_failure<E, R>(err: &SdkError<E, R>) -> bool {
    matches!(
        err,
        SdkError::DispatchFailure(_) | SdkError::TimeoutError(_)
    )
}

fn describe<E, R>(err: &SdkError<E, R>) -> String
where
    E: StdError + 'static,
    R: Debug,
{
    DisplayErrorContext(err).to_string()
}

#[async_trait]
impl Storage for S3Storage {
    async fn list_buckets(&self) -> StorageResult<Vec<String>> {
        let start = std::time::Instant::now();

        let output = self.client.list_buckets().send().await.map_err(|e| {
            tracing::error!(
                error = %describe(&e),
                endpoint = %self.endpoint_url,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 list buckets failed"
            );
            if is_connection_failure(&e) {
                StorageError::Connection(describe(&e))
            } else {
                StorageError::ListFailed(describe(&e))
            }
        })?;

        let buckets: Vec<String> = output
            .buckets()
            .iter()
            .filter_map(|b| b.name().map(str::to_string))
            .collect();

        tracing::debug!(
            endpoint = %self.endpoint_url,
            bucket_count = buckets.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 list buckets successful"
        );

        Ok(buckets)
    }

    fn list_objects(&self, bucket: String) -> BoxStream<'_, StorageResult<String>> {
        // State: None once the last page is consumed, Some(token) otherwise.
        let first_page: Option<Option<String>> = Some(None);

        stream::try_unfold(first_page, move |state| {
            let client = self.client.clone();
            let bucket = bucket.clone();
            async move {
                let Some(token) = state else {
                    return Ok(None);
                };

                let mut req = client.list_objects_v2().bucket(&bucket);
                if let Some(token) = token {
                    req = req.continuation_token(token);
                }

                let resp = req.send().await.map_err(|e| {
                    tracing::error!(
                        error = %describe(&e),
                        bucket = %bucket,
                        "S3 list objects failed"
                    );
                    classify_failure(
                        e.code(),
                        is_connection_failure(&e),
                        &bucket,
                        describe(&e),
                        StorageError::ListFailed,
                    )
                })?;

                let keys: Vec<StorageResult<String>> = resp
                    .contents()
                    .iter()
                    .filter_map(|obj| obj.key().map(|k| Ok(k.to_string())))
                    .collect();

                let next = next_page(resp.is_truncated(), resp.next_continuation_token());

                Ok::<_, StorageError>(Some((stream::iter(keys), next)))
            }
        })
        .try_flatten()
        .boxed()
    }

    async fn put_file(&self, bucket: &str, key: &str, local_path: &Path) -> StorageResult<()> {
        let start = std::time::Instant::now();

        let body = match ByteStream::from_path(local_path).await {
            Ok(body) => body,
            Err(e) => {
                if !tokio::fs::try_exists(local_path).await.unwrap_or(true) {
                    return Err(StorageError::FileNotFound(local_path.to_path_buf()));
                }
                return Err(StorageError::UploadFailed(format!(
                    "Failed to read {}: {}",
                    local_path.display(),
                    e
                )));
            }
        };
        let size = body.size_hint().1.unwrap_or_default();

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %describe(&e),
                    bucket = %bucket,
                    key = %key,
                    size_bytes = size,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 upload failed"
                );
                classify_failure(
                    e.code(),
                    is_connection_failure(&e),
                    bucket,
                    describe(&e),
                    StorageError::UploadFailed,
                )
            })?;

        tracing::info!(
            bucket = %bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
