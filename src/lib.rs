//! `sales-ingest` is a small library for incremental batch ingestion: it
//! discovers flat files dropped into a landing directory, loads each into an
//! in-memory [`types::DataSet`], appends a derived `total_sales` column, and
//! appends the result to a relational sink table.
//!
//! A durable, append-only processed-file ledger makes re-runs idempotent:
//! a file is recorded only after its rows reach the sink, recorded files are
//! skipped forever after, and a file whose processing fails is retried
//! naturally on the next run.
//!
//! ## What gets ingested
//!
//! **File formats (classified by extension):**
//!
//! - **CSV**: `.csv`
//! - **JSON**: `.json` (array-of-objects or newline-delimited objects)
//! - **Parquet**: `.parquet`
//!
//! Files with any other extension in the landing directory are ignored.
//! Readers infer the column schema from the file itself; cells are typed
//! [`types::Value`]s, with empty cells / explicit JSON `null` mapping to
//! [`types::Value::Null`].
//!
//! ## Quick example: run the pipeline
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use sales_ingest::ledger::FileLedger;
//! use sales_ingest::pipeline::{RunOptions, StdErrObserver, run_pipeline};
//! use sales_ingest::sink::MemorySink;
//!
//! # fn main() -> Result<(), sales_ingest::PipelineError> {
//! let ledger = FileLedger::new("./historico_arquivos.ndjson");
//! let mut sink = MemorySink::new();
//! let options = RunOptions {
//!     observer: Some(Arc::new(StdErrObserver)),
//!     ..Default::default()
//! };
//!
//! let log = run_pipeline("./data", &ledger, &mut sink, &options)?;
//! println!(
//!     "processed={} skipped={} failed={}",
//!     log.processed_count(),
//!     log.skipped_count(),
//!     log.failed_count()
//! );
//! # Ok(())
//! # }
//! ```
//!
//! Re-running against an unchanged directory reports every file as
//! skipped-duplicate and writes nothing to the sink.
//!
//! ## Reading and transforming a single file
//!
//! ```no_run
//! use sales_ingest::reader::read_batch_from_path;
//! use sales_ingest::transform::with_total_sales;
//!
//! # fn main() -> Result<(), sales_ingest::PipelineError> {
//! // Format inferred from the extension (.csv/.json/.parquet).
//! let batch = read_batch_from_path("data/vendas_01.csv")?;
//! let with_totals = with_total_sales(&batch)?;
//! println!("rows={}", with_totals.row_count());
//! # Ok(())
//! # }
//! ```
//!
//! ## The transform itself
//!
//! ```rust
//! use sales_ingest::transform::with_total_sales;
//! use sales_ingest::types::{DataSet, DataType, Field, Schema, Value};
//!
//! let schema = Schema::new(vec![
//!     Field::new("quantity", DataType::Int64),
//!     Field::new("unit_price", DataType::Float64),
//! ]);
//! let batch = DataSet::new(
//!     schema,
//!     vec![
//!         vec![Value::Int64(3), Value::Float64(10.0)],
//!         vec![Value::Int64(0), Value::Float64(5.0)],
//!     ],
//! );
//!
//! let out = with_total_sales(&batch).unwrap();
//! assert_eq!(out.rows[0][2], Value::Float64(30.0));
//! assert_eq!(out.rows[1][2], Value::Float64(0.0));
//! ```
//!
//! ## Modules
//!
//! - [`discover`]: landing-directory scan and format classification
//! - [`reader`]: per-format readers and the unified entrypoints
//! - [`transform`]: the derived-column computation
//! - [`ledger`]: the durable processed-file ledger
//! - [`sink`]: sink writers (in-memory; PostgreSQL behind `postgres-sink`)
//! - [`pipeline`]: the per-run controller and its observers
//! - [`config`]: explicit configuration values, optionally from the environment
//! - [`types`]: schema + in-memory batch types
//! - [`error`]: the error type used across the crate
//!
//! ## Delivery guarantee
//!
//! Within a run, no file is written to the sink more than once. Across a
//! crash between a sink write and the matching ledger record, the file is
//! re-processed on the next run: delivery is at-least-once, never zero.

pub mod config;
pub mod discover;
pub mod error;
pub mod ledger;
pub mod pipeline;
pub mod reader;
pub mod sink;
pub mod transform;
pub mod types;

pub use error::{PipelineError, PipelineResult};
