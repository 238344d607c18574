//! Run reporting.
//!
//! [`RunReporter`] collects one [`RecordOutcome`] per processed record, logs
//! a console line for each, and produces the final [`RunOutcome`].

pub mod logs;

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{DocumentError, PipelineResult, RejectionReason, SourceError};
use crate::models::ValidatedRecipient;

pub use logs::{log_error, log_info, log_success, log_warning, LogBroadcaster, LogEntry, LogLevel, LOG_BROADCASTER};

/// What happened to one input record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum RecordOutcome {
    /// PDF written.
    Generated { line: u64, recipient: String, path: PathBuf },
    /// Letter rendered but not written (dry run).
    Rendered { line: u64, recipient: String },
    /// Record passed validation (check only).
    Valid { line: u64, recipient: String },
    /// Record rejected before rendering.
    Skipped { line: u64, reason: RejectionReason, message: String },
    /// Letter could not be written.
    Failed { line: u64, recipient: String, message: String },
}

/// How the run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Completed,
    Aborted { message: String },
}

/// Whether letters were produced or records only validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunKind {
    Generate,
    Check,
}

/// Final tally of a run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunOutcome {
    pub kind: RunKind,
    pub status: RunStatus,
    /// Distinct output files written.
    pub generated: usize,
    /// Writes that replaced a file written earlier in the same run.
    pub overwritten: usize,
    pub rendered: usize,
    pub valid: usize,
    pub skipped: usize,
    pub failed: usize,
    pub records: Vec<RecordOutcome>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunOutcome {
    /// Number of records that reached the reporter.
    pub fn processed(&self) -> usize {
        self.records.len()
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self.status, RunStatus::Aborted { .. })
    }

    /// One-line summary.
    pub fn summary(&self) -> String {
        if self.kind == RunKind::Check {
            return format!("{} valid, {} skipped", self.valid, self.skipped);
        }

        let mut parts = vec![format!("{} letter(s) generated", self.generated)];
        if self.rendered > 0 {
            parts.push(format!("{} rendered without writing", self.rendered));
        }
        parts.push(format!("{} skipped", self.skipped));
        parts.push(format!("{} failed", self.failed));
        parts.join(", ")
    }

    /// Write the outcome as pretty JSON.
    pub fn save_json(&self, path: impl AsRef<Path>) -> PipelineResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// Accumulates outcomes in input order.
pub struct RunReporter {
    kind: RunKind,
    records: Vec<RecordOutcome>,
    written: HashSet<PathBuf>,
    overwritten: usize,
    started_at: DateTime<Utc>,
}

impl RunReporter {
    pub fn new() -> Self {
        Self::with_kind(RunKind::Generate)
    }

    /// Reporter for a validation-only run.
    pub fn for_check() -> Self {
        Self::with_kind(RunKind::Check)
    }

    fn with_kind(kind: RunKind) -> Self {
        Self {
            kind,
            records: Vec::new(),
            written: HashSet::new(),
            overwritten: 0,
            started_at: Utc::now(),
        }
    }

    pub fn generated(&mut self, line: u64, recipient: &ValidatedRecipient, path: PathBuf) {
        let name = recipient.display_name();
        if self.written.insert(path.clone()) {
            log_success(format!("Generated letter for {} → {}", name, path.display()));
        } else {
            self.overwritten += 1;
            log_warning(format!(
                "Line {}: letter for {} overwrote {} written earlier in this run",
                line,
                name,
                path.display()
            ));
        }
        self.records.push(RecordOutcome::Generated { line, recipient: name, path });
    }

    pub fn rendered(&mut self, line: u64, recipient: &ValidatedRecipient) {
        let name = recipient.display_name();
        log_info(format!("Rendered letter for {} (not written)", name));
        self.records.push(RecordOutcome::Rendered { line, recipient: name });
    }

    pub fn valid(&mut self, line: u64, recipient: &ValidatedRecipient) {
        let name = recipient.display_name();
        log_success(format!("Line {}: {} OK ({} for {})", line, name, recipient.amount, recipient.concept));
        self.records.push(RecordOutcome::Valid { line, recipient: name });
    }

    pub fn skipped(&mut self, line: u64, reason: RejectionReason, message: impl Into<String>) {
        let message = message.into();
        log_warning(format!("Line {}: skipped ({}): {}", line, reason, message));
        self.records.push(RecordOutcome::Skipped { line, reason, message });
    }

    pub fn failed(&mut self, line: u64, error: &DocumentError) {
        log_error(format!("Line {}: {}", line, error));
        self.records.push(RecordOutcome::Failed {
            line,
            recipient: error.recipient().to_string(),
            message: error.to_string(),
        });
    }

    /// End of input: log the summary and close the run.
    pub fn finish(self) -> RunOutcome {
        let outcome = self.into_outcome(RunStatus::Completed);
        log_success(format!("Done: {}", outcome.summary()));
        outcome
    }

    /// The source failed; nothing more will be processed.
    pub fn abort(self, error: &SourceError) -> RunOutcome {
        let outcome = self.into_outcome(RunStatus::Aborted {
            message: error.to_string(),
        });
        log_error(format!(
            "Run aborted after {} record(s): {}",
            outcome.processed(),
            error
        ));
        outcome
    }

    fn into_outcome(self, status: RunStatus) -> RunOutcome {
        let count = |pred: fn(&RecordOutcome) -> bool| self.records.iter().filter(|r| pred(r)).count();

        let rendered = count(|r| matches!(r, RecordOutcome::Rendered { .. }));
        let valid = count(|r| matches!(r, RecordOutcome::Valid { .. }));
        let skipped = count(|r| matches!(r, RecordOutcome::Skipped { .. }));
        let failed = count(|r| matches!(r, RecordOutcome::Failed { .. }));

        RunOutcome {
            kind: self.kind,
            status,
            generated: self.written.len(),
            overwritten: self.overwritten,
            rendered,
            valid,
            skipped,
            failed,
            records: self.records,
            started_at: self.started_at,
            finished_at: Utc::now(),
        }
    }
}

impl Default for RunReporter {
    fn default() -> Self {
        Self::new()
    }
}
