//! High-level pipeline: input rows in, one PDF letter per recipient out.
//!
//! Steps, in order:
//! 1. Load the template (fatal on failure)
//! 2. Open the record source (fatal on failure)
//! 3. For each row: validate, render, write, report
//! 4. Log the summary
//!
//! [`check`] runs step 2 and the validation half of step 3 only.
//!
//! Records are handled one at a time in input order. Anything that goes
//! wrong with a single record is reported and the run moves on.
//!
//! # Example
//!
//! ```rust,ignore
//! use awardgen::pipeline::{run, RunOptions};
//!
//! let outcome = run(&RunOptions::new("recipients.csv", "letter.txt"))?;
//! println!("{} letters", outcome.generated);
//! ```

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::document::{unencodable_chars, DocumentWriter, PageLayout};
use crate::error::{PipelineResult, RejectionReason};
use crate::models::RawRecord;
use crate::parser::{RecordSource, DEFAULT_DELIMITER};
use crate::report::{log_info, log_warning, RunOutcome, RunReporter};
use crate::template::Template;
use crate::validation::validate;

/// Options for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RunOptions {
    /// Delimiter-separated recipient list.
    pub input: PathBuf,

    /// Letter template.
    pub template: PathBuf,

    pub delimiter: char,

    /// Where PDFs are written.
    pub output_dir: PathBuf,

    pub layout: PageLayout,

    /// Validate and render but write nothing.
    pub dry_run: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            template: PathBuf::new(),
            delimiter: DEFAULT_DELIMITER,
            output_dir: PathBuf::from("."),
            layout: PageLayout::default(),
            dry_run: false,
        }
    }
}

impl RunOptions {
    pub fn new(input: impl Into<PathBuf>, template: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            template: template.into(),
            ..Self::default()
        }
    }
}

/// Run the whole pipeline.
///
/// Returns `Err` only when the template or the input cannot be opened. A
/// source that fails mid-stream yields an aborted [`RunOutcome`].
pub fn run(options: &RunOptions) -> PipelineResult<RunOutcome> {
    log_info(format!("📄 Template: {}", options.template.display()));
    let template = Template::load(&options.template)?;
    warn_about_template(&template);

    let source = open_source(&options.input, options.delimiter)?;
    let writer = DocumentWriter::new(&options.output_dir, options.layout.clone());

    Ok(drive(source, RunReporter::new(), |record, reporter| {
        process_record(record, &template, &writer, options.dry_run, reporter)
    }))
}

/// Validate every record without a template and without writing anything.
///
/// Each record is reported as valid or skipped with its reason. Fails and
/// aborts under the same conditions as [`run`].
pub fn check(input: &Path, delimiter: char) -> PipelineResult<RunOutcome> {
    let source = open_source(input, delimiter)?;

    Ok(drive(source, RunReporter::for_check(), |record, reporter| match validate(record) {
        Ok(recipient) => reporter.valid(record.line, &recipient),
        Err(e) => reporter.skipped(record.line, e.reason(), e.to_string()),
    }))
}

fn open_source(input: &Path, delimiter: char) -> PipelineResult<RecordSource<File>> {
    log_info(format!("📖 Reading recipients: {}", input.display()));
    let source = match RecordSource::open(input, delimiter) {
        Ok(source) => source,
        Err(e) => {
            RunReporter::new().abort(&e);
            return Err(e.into());
        }
    };
    log_info(format!("Columns: {}", source.headers().join(", ")));
    Ok(source)
}

/// Feed every record to `handle`, turning source errors into skips or an abort.
fn drive<R: Read>(
    source: RecordSource<R>,
    mut reporter: RunReporter,
    mut handle: impl FnMut(&RawRecord, &mut RunReporter),
) -> RunOutcome {
    for item in source {
        match item {
            Ok(record) => handle(&record, &mut reporter),
            Err(e) if e.is_recoverable() => {
                reporter.skipped(e.line().unwrap_or(0), RejectionReason::MalformedRow, e.to_string())
            }
            Err(e) => return reporter.abort(&e),
        }
    }

    reporter.finish()
}

/// Validate, render and write one record. Never fails the run.
fn process_record(
    record: &RawRecord,
    template: &Template,
    writer: &DocumentWriter,
    dry_run: bool,
    reporter: &mut RunReporter,
) {
    let recipient = match validate(record) {
        Ok(recipient) => recipient,
        Err(e) => {
            reporter.skipped(record.line, e.reason(), e.to_string());
            return;
        }
    };

    let letter = template.render(&recipient);

    let unshown = unencodable_chars(letter.as_str());
    if !unshown.is_empty() {
        let chars: String = unshown.into_iter().collect();
        log_warning(format!(
            "Line {}: letter for {} has characters the PDF font cannot show, they will be missing: {}",
            record.line,
            recipient.display_name(),
            chars
        ));
    }

    if dry_run {
        reporter.rendered(record.line, &recipient);
        return;
    }

    match writer.write(&letter, &recipient) {
        Ok(path) => reporter.generated(record.line, &recipient, path),
        Err(e) => reporter.failed(record.line, &e),
    }
}

fn warn_about_template(template: &Template) {
    let report = template.inspect();
    for placeholder in report.missing {
        log_warning(format!("Template never uses {}", placeholder.token()));
    }
    if !report.unknown.is_empty() {
        log_warning(format!(
            "Template tokens left untouched: {}",
            report.unknown.join(", ")
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use crate::report::logs::drain;
    use crate::report::{LogLevel, RecordOutcome, LOG_BROADCASTER};
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    const HEADER: &str = "FIRST-NAME;LAST-NAME;CONCEPT;AMOUNT";
    const TEMPLATE: &str = "Dear {FIRST-NAME} {LAST-NAME}, you received {AMOUNT} for {CONCEPT}.";

    fn setup(rows: &[&str]) -> (TempDir, RunOptions) {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("recipients.csv");
        let template = dir.path().join("letter.txt");
        let out = dir.path().join("out");

        let mut csv = String::from(HEADER);
        for row in rows {
            csv.push('\n');
            csv.push_str(row);
        }
        fs::write(&input, csv).unwrap();
        fs::write(&template, TEMPLATE).unwrap();
        fs::create_dir(&out).unwrap();

        let options = RunOptions {
            output_dir: out,
            ..RunOptions::new(input, template)
        };
        (dir, options)
    }

    fn pdfs(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_default_options() {
        let opts = RunOptions::default();
        assert_eq!(opts.delimiter, ';');
        assert_eq!(opts.output_dir, PathBuf::from("."));
        assert!(!opts.dry_run);
    }

    #[test]
    fn test_options_from_partial_json() {
        let opts: RunOptions =
            serde_json::from_str(r#"{"input": "a.csv", "template": "t.txt", "dryRun": true}"#).unwrap();
        assert_eq!(opts.input, PathBuf::from("a.csv"));
        assert!(opts.dry_run);
        assert_eq!(opts.delimiter, ';');
    }

    #[test]
    fn test_one_valid_record() {
        let (_dir, options) = setup(&["Ana;García;Merit Scholarship;500"]);

        let outcome = run(&options).unwrap();

        assert_eq!(outcome.generated, 1);
        assert_eq!(outcome.skipped, 0);
        assert_eq!(pdfs(&options.output_dir), vec!["García, Ana.pdf"]);
    }

    #[test]
    fn test_empty_last_name_skipped() {
        let (_dir, options) = setup(&["Ana;;Merit Scholarship;500"]);

        let outcome = run(&options).unwrap();

        assert!(!outcome.is_aborted());
        assert_eq!(outcome.generated, 0);
        assert_eq!(outcome.skipped, 1);
        assert!(pdfs(&options.output_dir).is_empty());
        assert!(matches!(
            outcome.records[0],
            RecordOutcome::Skipped { reason: RejectionReason::EmptyName, line: 2, .. }
        ));
    }

    #[test]
    fn test_bad_rows_do_not_stop_the_batch() {
        let (_dir, options) = setup(&[
            "Ana;García;Merit;500",
            "Luis;Pérez;Merit",
            "Eva;Ruiz;Sports;abc",
            "   ;Soto;Arts;10",
            "Marta;López;Science;1200.005",
        ]);

        let outcome = run(&options).unwrap();

        assert_eq!(outcome.generated, 2);
        assert_eq!(outcome.skipped, 3);
        assert_eq!(pdfs(&options.output_dir), vec!["García, Ana.pdf", "López, Marta.pdf"]);

        let reasons: Vec<_> = outcome
            .records
            .iter()
            .filter_map(|r| match r {
                RecordOutcome::Skipped { reason, .. } => Some(*reason),
                _ => None,
            })
            .collect();
        assert_eq!(
            reasons,
            vec![
                RejectionReason::MalformedRow,
                RejectionReason::MissingField,
                RejectionReason::EmptyName
            ]
        );
    }

    #[test]
    fn test_outcomes_follow_input_order() {
        let (_dir, options) = setup(&["A;One;x;1", "B;;x;1", "C;Three;x;1"]);

        let outcome = run(&options).unwrap();

        let lines: Vec<u64> = outcome
            .records
            .iter()
            .map(|r| match r {
                RecordOutcome::Generated { line, .. }
                | RecordOutcome::Rendered { line, .. }
                | RecordOutcome::Valid { line, .. }
                | RecordOutcome::Skipped { line, .. }
                | RecordOutcome::Failed { line, .. } => *line,
            })
            .collect();
        assert_eq!(lines, vec![2, 3, 4]);
    }

    #[test]
    fn test_duplicate_names_overwrite() {
        let (_dir, options) = setup(&["Ana;García;First;1", " Ana ; García ;Second;2"]);

        let outcome = run(&options).unwrap();

        assert_eq!(outcome.generated, 1);
        assert_eq!(outcome.overwritten, 1);
        assert_eq!(pdfs(&options.output_dir).len(), outcome.generated);
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let (_dir, mut options) = setup(&["Ana;García;Merit;500"]);
        options.dry_run = true;

        let outcome = run(&options).unwrap();

        assert_eq!(outcome.rendered, 1);
        assert_eq!(outcome.generated, 0);
        assert!(pdfs(&options.output_dir).is_empty());
    }

    #[test]
    fn test_write_failure_is_per_record() {
        let (dir, mut options) = setup(&["Ana;García;Merit;500", "Luis;Pérez;Merit;20"]);
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();
        options.output_dir = blocker;

        let outcome = run(&options).unwrap();

        assert!(!outcome.is_aborted());
        assert_eq!(outcome.failed, 2);
        assert_eq!(outcome.generated, 0);
    }

    #[test]
    fn test_missing_input_aborts() {
        let (dir, mut options) = setup(&[]);
        options.input = dir.path().join("missing.csv");

        let err = run(&options).unwrap_err();

        assert!(matches!(err, PipelineError::Source(_)));
        assert!(pdfs(&options.output_dir).is_empty());
    }

    #[test]
    fn test_missing_template_aborts_before_processing() {
        let (dir, mut options) = setup(&["Ana;García;Merit;500"]);
        options.template = dir.path().join("missing.txt");

        let err = run(&options).unwrap_err();

        assert!(matches!(err, PipelineError::Template(_)));
        assert!(pdfs(&options.output_dir).is_empty());
    }

    #[test]
    fn test_unshowable_characters_are_warned_about() {
        let (_dir, options) = setup(&["Paweł;Nowak;Merit;500", "Ana;García;Merit;500"]);
        let mut logs = LOG_BROADCASTER.subscribe();

        let outcome = run(&options).unwrap();

        assert_eq!(outcome.generated, 2);
        let warnings: Vec<_> = drain(&mut logs)
            .into_iter()
            .filter(|e| e.level == LogLevel::Warning && e.message.contains("cannot show"))
            .collect();
        assert!(warnings.iter().any(|e| e.message.contains("Paweł Nowak") && e.message.ends_with('ł')));
        assert!(!warnings.iter().any(|e| e.message.contains("Ana García")));
    }

    #[test]
    fn test_check_validates_without_template_or_output() {
        let (dir, options) = setup(&["Ana;García;Merit;500", "Eva;;Arts;10", "Luis;Pérez;Merit"]);
        fs::remove_file(&options.template).unwrap();

        let outcome = check(&options.input, options.delimiter).unwrap();

        assert!(!outcome.is_aborted());
        assert_eq!(outcome.valid, 1);
        assert_eq!(outcome.skipped, 2);
        assert_eq!(outcome.generated, 0);
        assert!(pdfs(&options.output_dir).is_empty());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
        assert!(matches!(
            outcome.records[1],
            RecordOutcome::Skipped { reason: RejectionReason::EmptyName, line: 3, .. }
        ));
    }

    #[test]
    fn test_check_missing_input_fails() {
        let (dir, _options) = setup(&[]);

        let err = check(&dir.path().join("missing.csv"), ';').unwrap_err();

        assert!(matches!(err, PipelineError::Source(_)));
    }

    #[test]
    fn test_header_only_input_completes() {
        let (_dir, options) = setup(&[]);

        let outcome = run(&options).unwrap();

        assert_eq!(outcome.processed(), 0);
        assert!(!outcome.is_aborted());
    }
}
