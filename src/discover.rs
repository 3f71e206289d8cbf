//! Landing-directory scan and format classification.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{PipelineError, PipelineResult};

/// Recognized landing-file formats.
///
/// This is a closed set: every dispatch over it is an exhaustive match, so
/// adding a format is a compile-time-checked extension point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FileFormat {
    /// Comma-separated values.
    Csv,
    /// JSON array-of-objects or NDJSON.
    Json,
    /// Apache Parquet.
    Parquet,
}

impl FileFormat {
    /// Parse a format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            "parquet" => Some(Self::Parquet),
            _ => None,
        }
    }
}

/// A file found during a landing-directory scan.
///
/// Ephemeral: recomputed every run from directory contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    /// Full path of the file.
    pub path: PathBuf,
    /// Format classified from the extension.
    pub format: FileFormat,
}

impl DiscoveredFile {
    /// Base filename, as recorded in the ledger.
    pub fn filename(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Scan `dir` and classify every entry with a recognized extension.
///
/// Entries with any other extension (or none) are silently skipped.
/// The result is in plain directory-listing order, which is not guaranteed
/// to be sorted; callers must not rely on it for correctness.
pub fn discover(dir: impl AsRef<Path>) -> PipelineResult<Vec<DiscoveredFile>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(PipelineError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let mut found = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let Some(format) = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(FileFormat::from_extension)
        else {
            continue;
        };
        found.push(DiscoveredFile { path, format });
    }
    Ok(found)
}
