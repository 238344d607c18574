//! Error types for the award letter pipeline.
//!
//! One error type per stage:
//!
//! - [`SourceError`] - reading the tabular input
//! - [`TemplateError`] - loading the letter template
//! - [`ValidationError`] - rejecting a record
//! - [`DocumentError`] - laying out or saving a PDF
//! - [`PipelineError`] - top-level orchestration errors
//!
//! Only [`PipelineError`] ever reaches `main`. Per-record errors
//! ([`ValidationError`], [`DocumentError`], recoverable [`SourceError`]s)
//! are turned into report entries at the record boundary.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// Record Source Errors
// =============================================================================

/// Errors while reading the tabular input.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The input file could not be opened.
    #[error("cannot open input '{}': {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The header row is missing or unreadable.
    #[error("cannot read header row: {0}")]
    Header(String),

    /// The configured delimiter is not a single-byte character.
    #[error("delimiter '{0}' must be a single ASCII character")]
    InvalidDelimiter(char),

    /// One row is malformed. The rest of the input is still readable.
    #[error("line {line}: {message}")]
    Row { line: u64, message: String },

    /// The underlying reader failed mid-stream.
    #[error("input read failed: {0}")]
    Read(String),
}

impl SourceError {
    /// Whether the source can keep producing records after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SourceError::Row { .. })
    }

    /// Input line the error refers to, when known.
    pub fn line(&self) -> Option<u64> {
        match self {
            SourceError::Row { line, .. } => Some(*line),
            _ => None,
        }
    }
}

// =============================================================================
// Template Errors
// =============================================================================

/// Errors while loading the letter template.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Missing file, permission denied, or invalid UTF-8.
    #[error("cannot read template '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Why a record was excluded from output generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RejectionReason {
    /// A required column is absent or its value is unusable.
    MissingField,
    /// First or last name is empty after trimming.
    EmptyName,
    /// The row itself could not be parsed.
    MalformedRow,
}

impl std::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            RejectionReason::MissingField => "missing-field",
            RejectionReason::EmptyName => "empty-name",
            RejectionReason::MalformedRow => "malformed-row",
        };
        f.write_str(label)
    }
}

/// A record failed validation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Required column missing from the record.
    #[error("missing field: {0}")]
    MissingField(String),

    /// Amount present but not a number.
    #[error("missing field: AMOUNT ('{0}' is not a number)")]
    UnparsableAmount(String),

    /// Name column blank after trimming.
    #[error("empty name: {0}")]
    EmptyName(String),
}

impl ValidationError {
    pub fn reason(&self) -> RejectionReason {
        match self {
            ValidationError::MissingField(_) | ValidationError::UnparsableAmount(_) => {
                RejectionReason::MissingField
            }
            ValidationError::EmptyName(_) => RejectionReason::EmptyName,
        }
    }
}

// =============================================================================
// Document Errors
// =============================================================================

/// Errors while producing one recipient's PDF.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// PDF layout or serialization failed.
    #[error("could not render letter for {recipient}: {message}")]
    Render { recipient: String, message: String },

    /// The output file could not be written.
    #[error("could not write letter for {recipient} to '{}': {source}", .path.display())]
    Io {
        recipient: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DocumentError {
    pub fn recipient(&self) -> &str {
        match self {
            DocumentError::Render { recipient, .. } | DocumentError::Io { recipient, .. } => {
                recipient
            }
        }
    }
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level errors returned by [`crate::pipeline::run`].
///
/// These abort the run. Everything that concerns a single record is
/// reported and skipped instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Writing the JSON run report failed.
    #[error("cannot write report: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for record source operations.
pub type SourceResult<T> = Result<T, SourceError>;

/// Result type for validation.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Result type for document operations.
pub type DocumentResult<T> = Result<T, DocumentError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
