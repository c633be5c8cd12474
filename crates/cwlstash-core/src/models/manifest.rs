//! Workflow-output manifest.
//!
//! A manifest is the JSON object a CWL runner prints when a workflow finishes:
//! logical output names mapped to records such as
//! `{"class": "File", "path": "/tmp/out/result.txt", "basename": "result.txt"}`.
//! Only `File` records are uploaded; everything else is carried along and skipped.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use crate::error::ManifestError;

pub const FILE_CLASS: &str = "File";

/// One manifest record. Extra CWL fields (`location`, `checksum`, `size`, ...)
/// are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ManifestEntry {
    pub class: String,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub basename: Option<String>,
}

impl ManifestEntry {
    pub fn is_file(&self) -> bool {
        self.class == FILE_CLASS
    }
}

/// A validated `File` entry ready for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutput {
    /// Logical output name from the manifest
    pub name: String,
    /// Local source path
    pub path: PathBuf,
    /// Object key to store the file under
    pub basename: String,
}

/// Parsed manifest. Entry order follows the JSON document.
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    entries: Vec<(String, ManifestEntry)>,
    files: Vec<FileOutput>,
}

impl Manifest {
    /// Read and validate a manifest file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Parse and validate a manifest document.
    ///
    /// Every `File` entry must carry `path` and `basename`; a single bad entry
    /// rejects the whole manifest so nothing is uploaded from it.
    pub fn from_json_str(raw: &str) -> Result<Self, ManifestError> {
        let document: Map<String, Value> = serde_json::from_str(raw)?;

        let mut entries = Vec::with_capacity(document.len());
        let mut files = Vec::new();

        for (name, value) in document {
            let entry: ManifestEntry = serde_json::from_value(value).map_err(|source| {
                ManifestError::InvalidEntry {
                    entry: name.clone(),
                    source,
                }
            })?;

            if entry.is_file() {
                let path = entry.path.clone().ok_or_else(|| ManifestError::MissingField {
                    entry: name.clone(),
                    field: "path",
                })?;
                let basename =
                    entry
                        .basename
                        .clone()
                        .ok_or_else(|| ManifestError::MissingField {
                            entry: name.clone(),
                            field: "basename",
                        })?;
                files.push(FileOutput {
                    name: name.clone(),
                    path: PathBuf::from(path),
                    basename,
                });
            }

            entries.push((name, entry));
        }

        Ok(Manifest { entries, files })
    }

    /// All entries, `File` or not.
    pub fn entries(&self) -> &[(String, ManifestEntry)] {
        &self.entries
    }

    /// The `File` entries, in manifest order.
    pub fn files(&self) -> &[FileOutput] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries that will not be uploaded.
    pub fn skipped(&self) -> usize {
        self.entries.len() - self.files.len()
    }
}
