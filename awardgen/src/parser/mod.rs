//! Streaming record source over delimiter-separated input.
//!
//! The first row is the header; every following row becomes a [`RawRecord`]
//! keyed by header name. Rows are read lazily, one per call to
//! [`Iterator::next`], and each step has three outcomes:
//!
//! - `Some(Ok(record))` - next record
//! - `Some(Err(e))` - a malformed row (recoverable, see
//!   [`SourceError::is_recoverable`]) or a fatal read failure
//! - `None` - end of input, or the step after a fatal failure
//!
//! # Example
//! ```ignore
//! use awardgen::parser::RecordSource;
//!
//! let csv = "FIRST-NAME;LAST-NAME\nAna;García";
//! let mut source = RecordSource::from_reader(csv.as_bytes(), ';').unwrap();
//! let record = source.next().unwrap().unwrap();
//! assert_eq!(record.get("LAST-NAME"), Some("García"));
//! ```

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ErrorKind, ReaderBuilder, StringRecord, StringRecordsIntoIter, Trim};

use crate::error::{SourceError, SourceResult};
use crate::models::RawRecord;

/// Default field delimiter.
pub const DEFAULT_DELIMITER: char = ';';

/// Lazy, single-pass sequence of input records.
pub struct RecordSource<R: Read> {
    headers: Vec<String>,
    rows: StringRecordsIntoIter<R>,
    finished: bool,
}

impl RecordSource<File> {
    /// Open `path` and read its header row.
    ///
    /// Fails with [`SourceError::Open`] when the file cannot be opened, in
    /// which case no record is ever produced.
    pub fn open(path: impl AsRef<Path>, delimiter: char) -> SourceResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| SourceError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file, delimiter)
    }
}

impl<R: Read> RecordSource<R> {
    /// Build a source over any reader.
    pub fn from_reader(reader: R, delimiter: char) -> SourceResult<Self> {
        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter_byte(delimiter)?)
            .has_headers(true)
            .flexible(false)
            .trim(Trim::Headers)
            .from_reader(reader);

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| SourceError::Header(e.to_string()))?
            .iter()
            .map(str::to_string)
            .collect();

        if headers.iter().all(|h| h.is_empty()) {
            return Err(SourceError::Header("input has no header row".to_string()));
        }

        Ok(Self {
            headers,
            rows: reader.into_records(),
            finished: false,
        })
    }

    /// Column names from the header row.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    fn to_raw(&self, row: &StringRecord) -> RawRecord {
        let line = row.position().map(|p| p.line()).unwrap_or(0);
        let fields = self
            .headers
            .iter()
            .cloned()
            .zip(row.iter().map(str::to_string))
            .collect();
        RawRecord::new(line, fields)
    }
}

impl<R: Read> Iterator for RecordSource<R> {
    type Item = SourceResult<RawRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.rows.next() {
            None => {
                self.finished = true;
                None
            }
            Some(Ok(row)) => Some(Ok(self.to_raw(&row))),
            Some(Err(e)) => {
                let err = classify(e);
                if !err.is_recoverable() {
                    self.finished = true;
                }
                Some(Err(err))
            }
        }
    }
}

/// Split `csv` errors into per-row problems and reader failures.
fn classify(err: csv::Error) -> SourceError {
    let line = err.position().map(|p| p.line()).unwrap_or(0);
    match err.kind() {
        ErrorKind::UnequalLengths { expected_len, len, .. } => SourceError::Row {
            line,
            message: format!("found {} fields, expected {}", len, expected_len),
        },
        ErrorKind::Utf8 { err, .. } => SourceError::Row {
            line,
            message: format!("invalid UTF-8: {}", err),
        },
        _ => SourceError::Read(err.to_string()),
    }
}

fn delimiter_byte(delimiter: char) -> SourceResult<u8> {
    if delimiter.is_ascii() {
        Ok(delimiter as u8)
    } else {
        Err(SourceError::InvalidDelimiter(delimiter))
    }
}
