//! Sink writers: append a materialized batch to a named destination table.

#[cfg(feature = "postgres-sink")]
pub mod postgres;

use std::collections::HashMap;

use crate::error::{PipelineError, PipelineResult};
use crate::types::DataSet;

#[cfg(feature = "postgres-sink")]
pub use postgres::PostgresSink;

/// Destination for transformed batches.
///
/// Each `append` call is its own unit of work; nothing spans multiple files.
/// The destination is created with the batch's column types on first write.
pub trait SinkWriter {
    /// Append every row of `batch` to `table`.
    ///
    /// Returns the number of rows appended. Connectivity and destination
    /// schema-mismatch failures surface as [`PipelineError::SinkWrite`].
    fn append(&mut self, batch: &DataSet, table: &str) -> PipelineResult<usize>;
}

/// In-process sink that accumulates appended batches in memory.
///
/// Used by the integration tests, and useful for embedders that want to
/// post-process run output themselves before shipping it anywhere.
#[derive(Debug, Default)]
pub struct MemorySink {
    tables: HashMap<String, DataSet>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// The accumulated contents of `table`, if anything was appended.
    pub fn table(&self, name: &str) -> Option<&DataSet> {
        self.tables.get(name)
    }

    /// Total rows across all tables.
    pub fn total_rows(&self) -> usize {
        self.tables.values().map(DataSet::row_count).sum()
    }
}

impl SinkWriter for MemorySink {
    fn append(&mut self, batch: &DataSet, table: &str) -> PipelineResult<usize> {
        let appended = batch.row_count();
        match self.tables.get_mut(table) {
            None => {
                self.tables.insert(table.to_string(), batch.clone());
            }
            Some(existing) => {
                existing
                    .vstack(batch.clone())
                    .map_err(|e| PipelineError::SinkWrite {
                        message: format!("table '{table}': {e}"),
                    })?;
            }
        }
        Ok(appended)
    }
}
