//! Domain models for the award letter pipeline.
//!
//! - [`RawRecord`] - one input row, keyed by header name
//! - [`ValidatedRecipient`] - a row that passed validation
//! - [`RenderedLetter`] - template text with the recipient merged in

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// =============================================================================
// Column names
// =============================================================================

/// Required input columns. Matching is case-sensitive.
pub mod columns {
    pub const FIRST_NAME: &str = "FIRST-NAME";
    pub const LAST_NAME: &str = "LAST-NAME";
    pub const CONCEPT: &str = "CONCEPT";
    pub const AMOUNT: &str = "AMOUNT";

    /// In the order the validator checks them.
    pub const REQUIRED: [&str; 4] = [FIRST_NAME, LAST_NAME, CONCEPT, AMOUNT];
}

// =============================================================================
// Raw Record
// =============================================================================

/// One data row from the input, mapping header name to cell value.
///
/// Lives only until the validator has looked at it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    /// 1-based line number in the input file.
    pub line: u64,
    pub fields: HashMap<String, String>,
}

impl RawRecord {
    pub fn new(line: u64, fields: HashMap<String, String>) -> Self {
        Self { line, fields }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }
}

impl<K, V> FromIterator<(K, V)> for RawRecord
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            line: 0,
            fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

// =============================================================================
// Validated Recipient
// =============================================================================

/// A recipient ready to be merged into the template.
///
/// Names are trimmed and non-empty, `amount` is already formatted with
/// exactly two fraction digits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedRecipient {
    pub first_name: String,
    pub last_name: String,
    pub concept: String,
    pub amount: String,
}

impl ValidatedRecipient {
    /// "First Last", used in log lines and error messages.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

// =============================================================================
// Rendered Letter
// =============================================================================

/// Final letter text for one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLetter(String);

impl RenderedLetter {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RenderedLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
