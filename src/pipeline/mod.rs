//! The incremental ingestion controller.
//!
//! One run: initialize the ledger, snapshot its filenames, discover landing
//! files, then for each file either skip it (already recorded) or drive the
//! read → transform → write → record chain. The chain stops at the first
//! failing stage, the failure is reported, and the run continues with the
//! next file; one bad file never blocks the rest of the batch.
//!
//! The ledger record is deliberately the last step: a filename only enters
//! the ledger once its rows are in the sink. A crash between those two steps
//! leaves the file unrecorded, so the next run re-processes it. That makes
//! delivery at-least-once across crashes: a file may be appended twice, but
//! is never silently dropped.

pub mod observability;

use std::error::Error as StdError;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{DEFAULT_SINK_TABLE, PipelineConfig};
use crate::discover::{DiscoveredFile, FileFormat, discover};
use crate::error::{PipelineError, PipelineResult};
use crate::ledger::FileLedger;
use crate::reader::read_batch;
use crate::sink::SinkWriter;
use crate::transform::with_total_sales;

pub use observability::{
    CompositeObserver, FileObserver, PipelineObserver, Severity, StdErrObserver,
};

/// Stage of the per-file chain in which a failure occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Stage {
    /// Reading the file into a batch.
    Read,
    /// Computing the derived column.
    Transform,
    /// Appending to the sink table.
    Write,
    /// Recording the filename in the ledger.
    Record,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Read => "read",
            Stage::Transform => "transform",
            Stage::Write => "write",
            Stage::Record => "record",
        };
        f.write_str(name)
    }
}

/// Outcome of one discovered file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FileOutcome {
    /// Read, transformed, written to the sink and recorded in the ledger.
    Processed { rows: usize },
    /// Already present in the ledger; nothing was done.
    SkippedDuplicate,
    /// The chain stopped at `stage`. The file is not in the ledger and will
    /// be retried on the next run. A `Record` failure means the sink holds
    /// rows the ledger does not know about.
    Failed { stage: Stage, reason: String },
}

impl fmt::Display for FileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileOutcome::Processed { .. } => f.write_str("processed"),
            FileOutcome::SkippedDuplicate => f.write_str("skipped-duplicate"),
            FileOutcome::Failed { stage, reason } => write!(f, "failed:{stage}:{reason}"),
        }
    }
}

/// Per-file report collected into a [`RunLog`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileReport {
    /// Base filename, the ledger key.
    pub filename: String,
    /// Classified format.
    pub format: FileFormat,
    /// What happened.
    pub outcome: FileOutcome,
}

/// Ordered per-file outcomes of one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunLog {
    /// One report per discovered file, in discovery order.
    pub reports: Vec<FileReport>,
}

impl RunLog {
    /// Number of files that completed the full chain this run.
    pub fn processed_count(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| matches!(r.outcome, FileOutcome::Processed { .. }))
            .count()
    }

    /// Number of files skipped as already processed.
    pub fn skipped_count(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| matches!(r.outcome, FileOutcome::SkippedDuplicate))
            .count()
    }

    /// Number of files whose chain failed at some stage.
    pub fn failed_count(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| matches!(r.outcome, FileOutcome::Failed { .. }))
            .count()
    }

    /// Look up the report for `filename`, if that file was discovered.
    pub fn report_for(&self, filename: &str) -> Option<&FileReport> {
        self.reports.iter().find(|r| r.filename == filename)
    }
}

/// Options controlling a pipeline run.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct RunOptions {
    /// Destination table for transformed batches.
    pub sink_table: String,
    /// Optional observer for per-file outcomes.
    pub observer: Option<Arc<dyn PipelineObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: Severity,
}

impl fmt::Debug for RunOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunOptions")
            .field("sink_table", &self.sink_table)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            sink_table: DEFAULT_SINK_TABLE.to_string(),
            observer: None,
            alert_at_or_above: Severity::Critical,
        }
    }
}

/// Run the pipeline once over `source_dir`.
///
/// Per-file failures are reported in the returned [`RunLog`] and never abort
/// the run. Only a missing source directory or an unreadable ledger abort:
/// without the snapshot the controller could double-process every file, so
/// refusing to run is the only safe behavior.
///
/// Running two instances against the same directory concurrently is
/// unsupported; the snapshot-then-record scheme assumes a single writer.
pub fn run_pipeline(
    source_dir: impl AsRef<Path>,
    ledger: &FileLedger,
    sink: &mut dyn SinkWriter,
    options: &RunOptions,
) -> PipelineResult<RunLog> {
    ledger.initialize()?;
    let mut known = ledger.known_filenames()?;

    let discovered = discover(source_dir)?;
    info!(files = discovered.len(), known = known.len(), "landing scan complete");

    let mut log = RunLog::default();
    for file in discovered {
        let filename = file.filename();

        let (outcome, failure_severity) = if known.contains(&filename) {
            (FileOutcome::SkippedDuplicate, None)
        } else {
            match process_file(&file, ledger, sink, &options.sink_table) {
                Ok(rows) => {
                    // Also guards against the same name appearing twice in
                    // one listing.
                    known.insert(filename.clone());
                    (FileOutcome::Processed { rows }, None)
                }
                Err((stage, err)) => {
                    let severity = severity_for_error(&err);
                    (
                        FileOutcome::Failed {
                            stage,
                            reason: err.to_string(),
                        },
                        Some(severity),
                    )
                }
            }
        };

        let report = FileReport {
            filename,
            format: file.format,
            outcome,
        };
        notify(options, &report, failure_severity);
        log.reports.push(report);
    }

    info!(
        processed = log.processed_count(),
        skipped = log.skipped_count(),
        failed = log.failed_count(),
        "run complete"
    );
    Ok(log)
}

/// Run the pipeline using a [`PipelineConfig`] for the paths and table name.
///
/// Builds the ledger from `config.ledger_path`, scans
/// `config.source_directory`, and writes to `config.sink_table` (which takes
/// precedence over `options.sink_table`).
pub fn run_with_config(
    config: &PipelineConfig,
    sink: &mut dyn SinkWriter,
    options: &RunOptions,
) -> PipelineResult<RunLog> {
    let ledger = FileLedger::new(&config.ledger_path);
    let options = RunOptions {
        sink_table: config.sink_table.clone(),
        ..options.clone()
    };
    run_pipeline(&config.source_directory, &ledger, sink, &options)
}

/// The read → transform → write → record chain for one unseen file.
fn process_file(
    file: &DiscoveredFile,
    ledger: &FileLedger,
    sink: &mut dyn SinkWriter,
    sink_table: &str,
) -> Result<usize, (Stage, PipelineError)> {
    let batch = read_batch(&file.path, file.format).map_err(|e| (Stage::Read, e))?;
    let transformed = with_total_sales(&batch).map_err(|e| (Stage::Transform, e))?;
    let rows = sink
        .append(&transformed, sink_table)
        .map_err(|e| (Stage::Write, e))?;
    // Record only after the sink write succeeded; see the module docs for
    // the crash-window consequence.
    ledger
        .record(&file.filename(), Utc::now())
        .map_err(|e| (Stage::Record, e))?;
    Ok(rows)
}

fn notify(options: &RunOptions, report: &FileReport, failure_severity: Option<Severity>) {
    match &report.outcome {
        FileOutcome::Processed { rows } => {
            debug!(file = %report.filename, rows, "file processed");
            if let Some(obs) = options.observer.as_ref() {
                obs.on_processed(report);
            }
        }
        FileOutcome::SkippedDuplicate => {
            debug!(file = %report.filename, "file already processed, skipping");
            if let Some(obs) = options.observer.as_ref() {
                obs.on_skipped(report);
            }
        }
        FileOutcome::Failed { stage, reason } => {
            warn!(file = %report.filename, stage = ?stage, reason = %reason, "file failed");
            let severity = failure_severity.unwrap_or(Severity::Error);
            if let Some(obs) = options.observer.as_ref() {
                obs.on_failed(report, severity);
                if severity >= options.alert_at_or_above {
                    obs.on_alert(report, severity);
                }
            }
        }
    }
}

fn severity_for_error(e: &PipelineError) -> Severity {
    match e {
        PipelineError::Io(_)
        | PipelineError::SinkWrite { .. }
        | PipelineError::LedgerWrite { .. } => Severity::Critical,
        PipelineError::Parquet(err) => {
            // Parquet errors often wrap IO, but not always in a structured
            // way; check the source chain.
            if error_chain_contains_io(err) {
                Severity::Critical
            } else {
                Severity::Error
            }
        }
        PipelineError::Csv(err) => match err.kind() {
            csv::ErrorKind::Io(_) => Severity::Critical,
            _ => Severity::Error,
        },
        _ => Severity::Error,
    }
}

fn error_chain_contains_io(e: &(dyn StdError + 'static)) -> bool {
    let mut cur: Option<&(dyn StdError + 'static)> = Some(e);
    while let Some(err) = cur {
        if err.is::<std::io::Error>() {
            return true;
        }
        cur = err.source();
    }
    false
}
