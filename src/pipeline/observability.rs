use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use super::{FileOutcome, FileReport};

/// Severity classification for failed files, used for alert thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Informational event.
    Info,
    /// Warning-level event (non-fatal).
    Warning,
    /// Error-level event (the file failed).
    Error,
    /// Critical failure (I/O, sink connectivity, or a ledger write that
    /// leaves the sink and ledger out of step).
    Critical,
}

/// Observer interface for per-file run outcomes.
///
/// Implementors can record metrics, write operational logs, or trigger
/// alerts.
pub trait PipelineObserver: Send + Sync {
    /// Called when a file completed the full chain.
    fn on_processed(&self, _report: &FileReport) {}

    /// Called when a file was skipped because the ledger already knows it.
    fn on_skipped(&self, _report: &FileReport) {}

    /// Called when a file's chain stopped at some stage.
    fn on_failed(&self, _report: &FileReport, _severity: Severity) {}

    /// Called when a failure meets the alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failed`].
    fn on_alert(&self, report: &FileReport, severity: Severity) {
        self.on_failed(report, severity)
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn PipelineObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn PipelineObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl PipelineObserver for CompositeObserver {
    fn on_processed(&self, report: &FileReport) {
        for o in &self.observers {
            o.on_processed(report);
        }
    }

    fn on_skipped(&self, report: &FileReport) {
        for o in &self.observers {
            o.on_skipped(report);
        }
    }

    fn on_failed(&self, report: &FileReport, severity: Severity) {
        for o in &self.observers {
            o.on_failed(report, severity);
        }
    }

    fn on_alert(&self, report: &FileReport, severity: Severity) {
        for o in &self.observers {
            o.on_alert(report, severity);
        }
    }
}

/// Logs run outcomes to stderr.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl PipelineObserver for StdErrObserver {
    fn on_processed(&self, report: &FileReport) {
        if let FileOutcome::Processed { rows } = &report.outcome {
            eprintln!(
                "[pipeline][ok] format={:?} file={} rows={rows}",
                report.format, report.filename
            );
        }
    }

    fn on_skipped(&self, report: &FileReport) {
        eprintln!(
            "[pipeline][skip] format={:?} file={} already processed",
            report.format, report.filename
        );
    }

    fn on_failed(&self, report: &FileReport, severity: Severity) {
        if let FileOutcome::Failed { stage, reason } = &report.outcome {
            eprintln!(
                "[pipeline][{severity:?}] format={:?} file={} stage={stage:?} err={reason}",
                report.format, report.filename
            );
        }
    }

    fn on_alert(&self, report: &FileReport, severity: Severity) {
        if let FileOutcome::Failed { stage, reason } = &report.outcome {
            eprintln!(
                "[ALERT][pipeline][{severity:?}] format={:?} file={} stage={stage:?} err={reason}",
                report.format, report.filename
            );
        }
    }
}

/// Appends run outcomes to a local log file.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are
    /// ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append_line(&self, line: &str) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{line}");
        }
    }
}

impl PipelineObserver for FileObserver {
    fn on_processed(&self, report: &FileReport) {
        if let FileOutcome::Processed { rows } = &report.outcome {
            self.append_line(&format!(
                "{} ok format={:?} file={} rows={rows}",
                unix_ts(),
                report.format,
                report.filename
            ));
        }
    }

    fn on_skipped(&self, report: &FileReport) {
        self.append_line(&format!(
            "{} skip format={:?} file={}",
            unix_ts(),
            report.format,
            report.filename
        ));
    }

    fn on_failed(&self, report: &FileReport, severity: Severity) {
        if let FileOutcome::Failed { stage, reason } = &report.outcome {
            self.append_line(&format!(
                "{} fail severity={severity:?} format={:?} file={} stage={stage:?} err={reason}",
                unix_ts(),
                report.format,
                report.filename
            ));
        }
    }

    fn on_alert(&self, report: &FileReport, severity: Severity) {
        if let FileOutcome::Failed { stage, reason } = &report.outcome {
            self.append_line(&format!(
                "{} ALERT severity={severity:?} format={:?} file={} stage={stage:?} err={reason}",
                unix_ts(),
                report.format,
                report.filename
            ));
        }
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
