//! Configuration module
//!
//! Resolves the endpoint, credentials and target bucket for the storage client.
//! Every setting has a default aimed at a local MinIO instance, so resolution
//! never fails: unset variables silently fall back.
//!
//! Two environment surfaces are understood. The URL form
//! (`BOTO3_ENDPOINT_URL`) wins; the legacy host/port form (`BOTO_HOST`,
//! `BOTO_PORT`, `BOTO_SECURE`) is mapped onto the same record when no URL is set
//! and any one of those variables is present.

use std::env;
use std::fmt;

use crate::storage_types::StorageBackend;

const DEFAULT_ENDPOINT_URL: &str = "http://127.0.0.1:9010";
const DEFAULT_ACCESS_KEY: &str = "minioadmin";
const DEFAULT_SECRET_KEY: &str = "minioadmin";
const DEFAULT_BUCKET: &str = "bucket1";
const DEFAULT_REGION: &str = "us-east-1";
const DEFAULT_LEGACY_HOST: &str = "127.0.0.1";
const DEFAULT_LEGACY_PORT: &str = "9010";

/// Resolved storage client configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub endpoint_url: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    pub use_tls: bool,
    pub region: String,
    pub storage_backend: StorageBackend,
    pub local_storage_path: Option<String>,
}

impl Config {
    /// Resolve configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Resolve configuration through an arbitrary variable lookup.
    ///
    /// `from_env` is this function over `std::env::var`; tests pass a map so
    /// they never touch process-wide state.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let secure = lookup("BOTO_SECURE");
        let legacy_host = lookup("BOTO_HOST");
        let legacy_port = lookup("BOTO_PORT");
        let legacy_tls = secure.as_deref().map(parse_legacy_secure_flag);

        let endpoint_url = match lookup("BOTO3_ENDPOINT_URL") {
            Some(url) => url,
            None if legacy_host.is_some() || legacy_port.is_some() || secure.is_some() => {
                let scheme = if legacy_tls.unwrap_or(false) {
                    "https"
                } else {
                    "http"
                };
                format!(
                    "{}://{}:{}",
                    scheme,
                    legacy_host.as_deref().unwrap_or(DEFAULT_LEGACY_HOST),
                    legacy_port.as_deref().unwrap_or(DEFAULT_LEGACY_PORT)
                )
            }
            None => DEFAULT_ENDPOINT_URL.to_string(),
        };

        let use_tls = legacy_tls.unwrap_or_else(|| endpoint_url.starts_with("https://"));

        let storage_backend = match lookup("STORAGE_BACKEND") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "Unknown STORAGE_BACKEND, falling back to s3");
                StorageBackend::S3
            }),
            None => StorageBackend::S3,
        };

        Config {
            endpoint_url,
            access_key: lookup("AWS_ACCESS_KEY_ID").unwrap_or_else(|| DEFAULT_ACCESS_KEY.to_string()),
            secret_key: lookup("AWS_SECRET_ACCESS_KEY")
                .unwrap_or_else(|| DEFAULT_SECRET_KEY.to_string()),
            bucket: lookup("MINIO_BUCKET1").unwrap_or_else(|| DEFAULT_BUCKET.to_string()),
            use_tls,
            region: lookup("S3_REGION")
                .or_else(|| lookup("AWS_REGION"))
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_REGION.to_string()),
            storage_backend,
            local_storage_path: lookup("LOCAL_STORAGE_PATH").filter(|s| !s.is_empty()),
        }
    }

    pub fn is_local(&self) -> bool {
        self.storage_backend == StorageBackend::Local
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("endpoint_url", &self.endpoint_url)
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("bucket", &self.bucket)
            .field("use_tls", &self.use_tls)
            .field("region", &self.region)
            .field("storage_backend", &self.storage_backend)
            .field("local_storage_path", &self.local_storage_path)
            .finish()
    }
}

/// Parse a boolean-like flag against an explicit allow-list.
///
/// Accepts `true/1/yes/on` and `false/0/no/off`, case-insensitively. Anything
/// else is `None`.
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse `BOTO_SECURE` the way existing deployments expect.
///
/// Only the exact literal `"False"` disables TLS; every other value, including
/// `"false"`, `"0"` and the empty string, enables it. A warning is logged when
/// a value that reads as false is about to be treated as true.
pub fn parse_legacy_secure_flag(value: &str) -> bool {
    let secure = value != "False";
    if secure && parse_flag(value) == Some(false) {
        tracing::warn!(
            value = %value,
            "BOTO_SECURE only disables TLS for the exact value \"False\"; treating as secure"
        );
    }
    secure
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn resolve(vars: &[(&str, &str)]) -> Config {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = resolve(&[]);
        assert_eq!(config.endpoint_url, "http://127.0.0.1:9010");
        assert_eq!(config.access_key, "minioadmin");
        assert_eq!(config.secret_key, "minioadmin");
        assert_eq!(config.bucket, "bucket1");
        assert!(!config.use_tls);
        assert_eq!(config.region, "us-east-1");
        assert_eq!(config.storage_backend, StorageBackend::S3);
        assert!(config.local_storage_path.is_none());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn each_variable_overrides_only_its_field() {
        let defaults = resolve(&[]);

        let config = resolve(&[("BOTO3_ENDPOINT_URL", "http://minio:9000")]);
        assert_eq!(config.endpoint_url, "http://minio:9000");
        assert_eq!(config.access_key, defaults.access_key);

        let config = resolve(&[("AWS_ACCESS_KEY_ID", "AKIA")]);
        assert_eq!(config.access_key, "AKIA");
        assert_eq!(config.secret_key, defaults.secret_key);

        let config = resolve(&[("AWS_SECRET_ACCESS_KEY", "s3cret")]);
        assert_eq!(config.secret_key, "s3cret");
        assert_eq!(config.endpoint_url, defaults.endpoint_url);

        let config = resolve(&[("MINIO_BUCKET1", "results")]);
        assert_eq!(config.bucket, "results");
        assert_eq!(config.access_key, defaults.access_key);
    }

    #[test]
    fn secure_flag_only_false_literal_disables_tls() {
        assert!(!resolve(&[("BOTO_SECURE", "False")]).use_tls);
        for value in ["", "true", "True", "0", "false", "FALSE", "no", "anything"] {
            assert!(
                resolve(&[("BOTO_SECURE", value)]).use_tls,
                "BOTO_SECURE={value:?} should enable TLS"
            );
        }
    }

    #[test]
    fn legacy_secure_flag_matches_resolver() {
        assert!(!parse_legacy_secure_flag("False"));
        assert!(parse_legacy_secure_flag("false"));
        assert!(parse_legacy_secure_flag("0"));
        assert!(parse_legacy_secure_flag(""));
    }

    #[test]
    fn parse_flag_allow_list() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag(" yes "), Some(true));
        assert_eq!(parse_flag("1"), Some(true));
        assert_eq!(parse_flag("False"), Some(false));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("off"), Some(false));
        assert_eq!(parse_flag(""), None);
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn legacy_host_and_port_build_endpoint() {
        let config = resolve(&[("BOTO_HOST", "storage.local"), ("BOTO_PORT", "9000")]);
        assert_eq!(config.endpoint_url, "http://storage.local:9000");
        assert!(!config.use_tls);

        let config = resolve(&[("BOTO_PORT", "9443"), ("BOTO_SECURE", "True")]);
        assert_eq!(config.endpoint_url, "https://127.0.0.1:9443");
        assert!(config.use_tls);
    }

    #[test]
    fn secure_flag_alone_switches_default_endpoint_to_https() {
        let config = resolve(&[("BOTO_SECURE", "True")]);
        assert_eq!(config.endpoint_url, "https://127.0.0.1:9010");
        assert!(config.use_tls);

        let config = resolve(&[("BOTO_SECURE", "False")]);
        assert_eq!(config.endpoint_url, "http://127.0.0.1:9010");
        assert!(!config.use_tls);
    }

    #[test]
    fn endpoint_url_wins_over_legacy_surface() {
        let config = resolve(&[
            ("BOTO3_ENDPOINT_URL", "http://minio:9000"),
            ("BOTO_HOST", "ignored"),
            ("BOTO_PORT", "1234"),
        ]);
        assert_eq!(config.endpoint_url, "http://minio:9000");
    }

    #[test]
    fn tls_follows_endpoint_scheme_without_secure_flag() {
        assert!(resolve(&[("BOTO3_ENDPOINT_URL", "https://s3.example.com")]).use_tls);
        assert!(!resolve(&[("BOTO3_ENDPOINT_URL", "http://s3.example.com")]).use_tls);
    }

    #[test]
    fn region_prefers_s3_region() {
        let config = resolve(&[("S3_REGION", "eu-west-1"), ("AWS_REGION", "us-west-2")]);
        assert_eq!(config.region, "eu-west-1");
        let config = resolve(&[("AWS_REGION", "us-west-2")]);
        assert_eq!(config.region, "us-west-2");
    }

    #[test]
    fn storage_backend_selection() {
        let config = resolve(&[
            ("STORAGE_BACKEND", "local"),
            ("LOCAL_STORAGE_PATH", "/var/lib/cwlstash"),
        ]);
        assert!(config.is_local());
        assert_eq!(config.local_storage_path.as_deref(), Some("/var/lib/cwlstash"));

        let config = resolve(&[("STORAGE_BACKEND", "tape")]);
        assert_eq!(config.storage_backend, StorageBackend::S3);
    }

    #[test]
    fn debug_output_redacts_secret() {
        let config = resolve(&[("AWS_SECRET_ACCESS_KEY", "do-not-print")]);
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("do-not-print"));
        assert!(rendered.contains("<redacted>"));
    }
}
