//! Format readers: path + format → typed in-memory batch.
//!
//! One submodule per format, plus:
//!
//! - [`read_batch`]: dispatch on an already-classified [`FileFormat`]
//! - [`read_batch_from_path`]: infer the format from the file extension
//! - [`stack_directory`]: read a whole landing directory into one batch
//!
//! Readers infer the column schema from the file itself; the caller gets a
//! fully typed [`crate::types::DataSet`].

pub mod csv;
pub mod json;
pub mod parquet;

use std::path::Path;

use crate::discover::{FileFormat, discover};
use crate::error::{PipelineError, PipelineResult};
use crate::types::DataSet;

/// Read a file of a known format into a [`DataSet`].
pub fn read_batch(path: impl AsRef<Path>, format: FileFormat) -> PipelineResult<DataSet> {
    match format {
        FileFormat::Csv => csv::read_csv_from_path(path),
        FileFormat::Json => json::read_json_from_path(path),
        FileFormat::Parquet => parquet::read_parquet_from_path(path),
    }
}

/// Read a file, inferring the format from its extension.
pub fn read_batch_from_path(path: impl AsRef<Path>) -> PipelineResult<DataSet> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .ok_or_else(|| PipelineError::UnsupportedFormat {
            message: format!("path has no extension ({})", path.display()),
        })?;
    let format =
        FileFormat::from_extension(ext).ok_or_else(|| PipelineError::UnsupportedFormat {
            message: format!("unrecognized extension '{ext}' ({})", path.display()),
        })?;
    read_batch(path, format)
}

/// Read every recognized file in `dir` and stack all rows into one batch.
///
/// The first file's schema wins; later files must match it exactly. An empty
/// directory (or one with no recognized files) yields an empty dataset.
pub fn stack_directory(dir: impl AsRef<Path>) -> PipelineResult<DataSet> {
    let mut stacked: Option<DataSet> = None;
    for file in discover(dir)? {
        let batch = read_batch(&file.path, file.format)?;
        match &mut stacked {
            None => stacked = Some(batch),
            Some(acc) => acc.vstack(batch)?,
        }
    }
    Ok(stacked.unwrap_or_else(DataSet::empty))
}
