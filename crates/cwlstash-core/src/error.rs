//! Error types module
//!
//! Storage errors live in `cwlstash-storage`; this module holds the errors raised
//! while reading workflow-output manifests.

use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("Failed to read manifest {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed manifest JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Manifest entry '{entry}' is invalid: {source}")]
    InvalidEntry {
        entry: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Manifest entry '{entry}' is missing required field '{field}'")]
    MissingField { entry: String, field: &'static str },
}
