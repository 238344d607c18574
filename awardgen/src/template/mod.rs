//! Letter template loading and rendering.
//!
//! A template is plain text with up to four placeholder tokens:
//! `{FIRST-NAME}`, `{LAST-NAME}`, `{CONCEPT}` and `{AMOUNT}`.
//!
//! Rendering replaces only the **first** occurrence of each token. Later
//! occurrences, and any other `{...}` text, are left as they are. Values
//! are inserted verbatim, without escaping.

use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::TemplateError;
use crate::models::{RenderedLetter, ValidatedRecipient};

/// Anything that looks like a placeholder: `{UPPER-CASE}`.
static TOKEN_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{[A-Z][A-Z0-9_-]*\}").unwrap());

/// The fixed set of substitutable fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    FirstName,
    LastName,
    Concept,
    Amount,
}

impl Placeholder {
    pub const ALL: [Placeholder; 4] = [
        Placeholder::FirstName,
        Placeholder::LastName,
        Placeholder::Concept,
        Placeholder::Amount,
    ];

    /// Literal token as written in the template.
    pub fn token(self) -> &'static str {
        match self {
            Placeholder::FirstName => "{FIRST-NAME}",
            Placeholder::LastName => "{LAST-NAME}",
            Placeholder::Concept => "{CONCEPT}",
            Placeholder::Amount => "{AMOUNT}",
        }
    }

    fn value_of(self, recipient: &ValidatedRecipient) -> &str {
        match self {
            Placeholder::FirstName => &recipient.first_name,
            Placeholder::LastName => &recipient.last_name,
            Placeholder::Concept => &recipient.concept,
            Placeholder::Amount => &recipient.amount,
        }
    }
}

/// What [`Template::inspect`] found in the template text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateReport {
    /// Placeholders that never appear.
    pub missing: Vec<Placeholder>,
    /// Brace tokens that are not placeholders, in order of first appearance.
    pub unknown: Vec<String>,
}

/// Letter template, loaded once per run and never modified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    text: String,
}

impl Template {
    /// Read the whole template file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TemplateError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| TemplateError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self { text })
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// List missing placeholders and unrecognized tokens.
    pub fn inspect(&self) -> TemplateReport {
        let missing = Placeholder::ALL
            .into_iter()
            .filter(|p| !self.text.contains(p.token()))
            .collect();

        let mut unknown: Vec<String> = Vec::new();
        for m in TOKEN_PATTERN.find_iter(&self.text) {
            let token = m.as_str();
            let known = Placeholder::ALL.iter().any(|p| p.token() == token);
            if !known && !unknown.iter().any(|u| u == token) {
                unknown.push(token.to_string());
            }
        }

        TemplateReport { missing, unknown }
    }

    /// Merge a recipient into the template.
    ///
    /// Positions are located in the template before anything is inserted,
    /// so placeholder text inside a value is never substituted.
    pub fn render(&self, recipient: &ValidatedRecipient) -> RenderedLetter {
        let mut hits: Vec<(usize, Placeholder)> = Placeholder::ALL
            .into_iter()
            .filter_map(|p| self.text.find(p.token()).map(|pos| (pos, p)))
            .collect();
        hits.sort_by_key(|(pos, _)| *pos);

        let mut out = String::with_capacity(self.text.len() + 64);
        let mut cursor = 0;
        for (pos, placeholder) in hits {
            out.push_str(&self.text[cursor..pos]);
            out.push_str(placeholder.value_of(recipient));
            cursor = pos + placeholder.token().len();
        }
        out.push_str(&self.text[cursor..]);

        RenderedLetter::new(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn ana() -> ValidatedRecipient {
        ValidatedRecipient {
            first_name: "Ana".into(),
            last_name: "García".into(),
            concept: "Merit Scholarship".into(),
            amount: "500.00".into(),
        }
    }

    #[test]
    fn test_render_all_placeholders() {
        let template =
            Template::from_text("Dear {FIRST-NAME} {LAST-NAME}, you received {AMOUNT} for {CONCEPT}.");
        assert_eq!(
            template.render(&ana()).as_str(),
            "Dear Ana García, you received 500.00 for Merit Scholarship."
        );
    }

    #[test]
    fn test_only_first_occurrence_is_replaced() {
        let template = Template::from_text("{FIRST-NAME}, yes {FIRST-NAME}. {AMOUNT} {AMOUNT}");
        assert_eq!(template.render(&ana()).as_str(), "Ana, yes {FIRST-NAME}. 500.00 {AMOUNT}");
    }

    #[test]
    fn test_unknown_tokens_untouched() {
        let template = Template::from_text("{DATE} Hello {FIRST-NAME} {first-name}");
        assert_eq!(template.render(&ana()).as_str(), "{DATE} Hello Ana {first-name}");
    }

    #[test]
    fn test_values_are_not_rescanned() {
        let mut recipient = ana();
        recipient.first_name = "{LAST-NAME}".into();
        let template = Template::from_text("{FIRST-NAME} / {LAST-NAME}");
        assert_eq!(template.render(&recipient).as_str(), "{LAST-NAME} / García");
    }

    #[test]
    fn test_values_are_not_escaped() {
        let mut recipient = ana();
        recipient.concept = "R&D <award>\nsecond line".into();
        let template = Template::from_text("For {CONCEPT}");
        assert_eq!(template.render(&recipient).as_str(), "For R&D <award>\nsecond line");
    }

    #[test]
    fn test_template_without_placeholders() {
        let template = Template::from_text("Nothing to see.");
        assert_eq!(template.render(&ana()).as_str(), "Nothing to see.");
    }

    #[test]
    fn test_inspect() {
        let template = Template::from_text("{FIRST-NAME} {DATE} {AMOUNT} {DATE} {SIGNATURE}");
        let report = template.inspect();
        assert_eq!(report.missing, vec![Placeholder::LastName, Placeholder::Concept]);
        assert_eq!(report.unknown, vec!["{DATE}".to_string(), "{SIGNATURE}".to_string()]);
    }

    #[test]
    fn test_load_reads_whole_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "Dear {{FIRST-NAME}},\n\nCongratulations.\n").unwrap();

        let template = Template::load(file.path()).unwrap();
        assert_eq!(template.as_str(), "Dear {FIRST-NAME},\n\nCongratulations.\n");
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Template::load(dir.path().join("letter.txt")).unwrap_err();
        assert!(err.to_string().contains("letter.txt"));
    }
}
