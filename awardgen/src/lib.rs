//! # Awardgen - personalized award letters as PDF
//!
//! Awardgen reads a semicolon-delimited list of award recipients and a
//! plain-text letter template, and writes one PDF letter per recipient.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  CSV rows   │────▶│  Validator  │────▶│  Renderer   │────▶│  PDF writer │
//! │  (streamed) │     │ (per record)│     │ (template)  │     │ (justified) │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//!        │                   │                                       │
//!        └───────────────────┴──────────────▶ Run reporter ◀─────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use awardgen::{run, RunOptions};
//!
//! let outcome = run(&RunOptions::new("recipients.csv", "letter.txt")).unwrap();
//! println!("Generated {} letters", outcome.generated);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types per stage
//! - [`models`] - RawRecord, ValidatedRecipient, RenderedLetter
//! - [`parser`] - Streaming record source
//! - [`validation`] - Required fields, names, amount formatting
//! - [`template`] - Template loading and placeholder substitution
//! - [`document`] - Layout and PDF output
//! - [`report`] - Per-record outcomes, logs, summary
//! - [`pipeline`] - Everything wired together

// Core modules
pub mod error;
pub mod models;

// Stages
pub mod parser;
pub mod validation;
pub mod template;
pub mod document;
pub mod report;

// Orchestration
pub mod pipeline;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    DocumentError,
    PipelineError,
    RejectionReason,
    SourceError,
    TemplateError,
    ValidationError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{RawRecord, RenderedLetter, ValidatedRecipient};

// =============================================================================
// Re-exports - Stages
// =============================================================================

pub use parser::{RecordSource, DEFAULT_DELIMITER};
pub use validation::{format_amount, validate};
pub use template::{Placeholder, Template};
pub use document::{output_file_name, unencodable_chars, DocumentWriter, PageLayout};

// =============================================================================
// Re-exports - Reporting
// =============================================================================

pub use report::{RecordOutcome, RunKind, RunOutcome, RunReporter, RunStatus};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use pipeline::{check, run, RunOptions};
