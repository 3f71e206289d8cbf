//! Durable append-only ledger of processed filenames.
//!
//! The ledger is what makes re-runs idempotent: a filename recorded here was
//! fully written to the sink at some earlier point, and the controller skips
//! it forever after. Entries are newline-delimited JSON in a local file; the
//! store only grows; there are no update or delete operations.

use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PipelineError, PipelineResult};

/// One ledger entry: a filename and when it finished processing.
///
/// On disk the entry keeps the storage-side column names
/// (`nome_arquivo`, `horario_processamento`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Base filename, the entry's logical key.
    #[serde(rename = "nome_arquivo")]
    pub filename: String,
    /// When the file finished processing.
    #[serde(rename = "horario_processamento")]
    pub processed_at: DateTime<Utc>,
}

/// Append-only processed-file ledger backed by a newline-delimited JSON file.
#[derive(Debug, Clone)]
pub struct FileLedger {
    path: PathBuf,
}

impl FileLedger {
    /// Create a handle for the ledger at `path`.
    ///
    /// No I/O happens until [`initialize`](Self::initialize) or one of the
    /// read/append operations is called.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Idempotently create the backing store if absent.
    ///
    /// Creates parent directories and an empty ledger file; a no-op when the
    /// file already exists. Safe to call on every run.
    pub fn initialize(&self) -> PipelineResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| ledger_err("create ledger directory for", &self.path, e))?;
            }
        }
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| ledger_err("open ledger file", &self.path, e))?;
        Ok(())
    }

    /// Snapshot of all filenames currently recorded.
    ///
    /// Taken once per run by the controller; a missing ledger file reads as
    /// empty.
    pub fn known_filenames(&self) -> PipelineResult<HashSet<String>> {
        Ok(self.entries()?.into_iter().map(|e| e.filename).collect())
    }

    /// Full entry history, in append order.
    pub fn entries(&self) -> PipelineResult<Vec<LedgerEntry>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(ledger_err("read ledger file", &self.path, e)),
        };

        let mut entries = Vec::new();
        for (idx0, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let entry: LedgerEntry =
                serde_json::from_str(line).map_err(|e| PipelineError::LedgerWrite {
                    message: format!(
                        "corrupt entry at line {} of {}: {e}",
                        idx0 + 1,
                        self.path.display()
                    ),
                })?;
            entries.push(entry);
        }
        Ok(entries)
    }

    /// Append one entry and flush it to disk.
    ///
    /// Callers must only record a filename after its sink write succeeded;
    /// the controller enforces this ordering.
    pub fn record(&self, filename: &str, processed_at: DateTime<Utc>) -> PipelineResult<()> {
        let entry = LedgerEntry {
            filename: filename.to_string(),
            processed_at,
        };
        let line = serde_json::to_string(&entry).map_err(|e| PipelineError::LedgerWrite {
            message: format!("encode entry for '{filename}': {e}"),
        })?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| ledger_err("open ledger file", &self.path, e))?;
        writeln!(file, "{line}").map_err(|e| ledger_err("append to ledger file", &self.path, e))?;
        file.sync_data()
            .map_err(|e| ledger_err("flush ledger file", &self.path, e))?;

        debug!(filename, "ledger entry recorded");
        Ok(())
    }
}

fn ledger_err(action: &str, path: &Path, err: std::io::Error) -> PipelineError {
    PipelineError::LedgerWrite {
        message: format!("{action} {}: {err}", path.display()),
    }
}
