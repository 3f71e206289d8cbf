use std::path::PathBuf;

use thiserror::Error;

/// Convenience result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Error type shared across discovery, reading, transformation, sink writes
/// and the ledger.
///
/// Only [`PipelineError::DirectoryNotFound`] (and an unreadable ledger at run
/// start) abort a run; every other variant is a per-file failure that the
/// controller reports and steps past.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The landing directory does not exist.
    #[error("source directory not found: {}", .path.display())]
    DirectoryNotFound { path: PathBuf },

    /// Underlying I/O error (e.g. file vanished, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The format of a file could not be determined or is not handled.
    #[error("unsupported format: {message}")]
    UnsupportedFormat { message: String },

    /// CSV parse failure.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Parquet decode failure.
    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// The file parsed but its content does not form a valid batch.
    #[error("malformed file: {message}")]
    Malformed { message: String },

    /// A batch is missing a required column, or a column has the wrong type.
    #[error("schema mismatch: {message}")]
    Schema { message: String },

    /// Appending to the sink failed (connectivity or destination schema).
    #[error("sink write failed: {message}")]
    SinkWrite { message: String },

    /// The ledger store is unreachable, rejected a write, or is corrupt.
    ///
    /// When this happens after a successful sink write, the sink holds rows
    /// the ledger does not know about; the distinct variant lets operators
    /// spot those files for manual reconciliation.
    #[error("ledger write failed: {message}")]
    LedgerWrite { message: String },
}
