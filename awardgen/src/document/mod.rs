//! PDF output for rendered letters.
//!
//! [`DocumentWriter`] names the file after the recipient, lays the text out
//! with [`layout`], serializes it with printpdf and swaps the finished file
//! into place. A failed write never leaves a truncated PDF behind.

pub mod layout;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use printpdf::{BuiltinFont, Mm, PdfDocument};
use tempfile::NamedTempFile;

use crate::error::{DocumentError, DocumentResult};
use crate::models::{RenderedLetter, ValidatedRecipient};

pub use layout::{lay_out, PageContent, PageLayout, TextRun};

/// `"<LastName>, <FirstName>.pdf"`.
///
/// Path separators and NUL are replaced with `_` so the file always lands
/// in the output directory.
pub fn output_file_name(recipient: &ValidatedRecipient) -> String {
    format!(
        "{}, {}.pdf",
        sanitize_component(&recipient.last_name),
        sanitize_component(&recipient.first_name)
    )
}

fn sanitize_component(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c => c,
        })
        .collect()
}

/// Characters of `text` the built-in Courier font cannot show.
///
/// Built-in fonts are WinAnsi encoded: printable ASCII, Latin-1 from
/// U+00A0, and the Windows-1252 extras in 0x80-0x9F. Anything else is
/// dropped from the PDF. Control characters are ignored since layout
/// never emits them. Each character is listed once, in order of appearance.
pub fn unencodable_chars(text: &str) -> Vec<char> {
    let mut found = Vec::new();
    for c in text.chars() {
        if c.is_control() || is_winansi(c) || found.contains(&c) {
            continue;
        }
        found.push(c);
    }
    found
}

fn is_winansi(c: char) -> bool {
    matches!(c, ' '..='~' | '\u{A0}'..='\u{FF}') || WINANSI_EXTRAS.contains(&c)
}

const WINANSI_EXTRAS: [char; 27] = [
    '€', '‚', 'ƒ', '„', '…', '†', '‡', 'ˆ', '‰', 'Š', '‹', 'Œ', 'Ž', '\u{2018}', '\u{2019}',
    '\u{201C}', '\u{201D}', '•', '–', '—', '˜', '™', 'š', '›', 'œ', 'ž', 'Ÿ',
];

/// Build the PDF bytes for one letter.
pub fn render_pdf(title: &str, text: &str, layout: &PageLayout) -> Result<Vec<u8>, String> {
    let pages = lay_out(text, layout);
    let width = Mm(layout.page_width);
    let height = Mm(layout.page_height);

    let (doc, first_page, first_layer) = PdfDocument::new(title, width, height, "Letter");
    let font = doc
        .add_builtin_font(BuiltinFont::Courier)
        .map_err(|e| e.to_string())?;

    let mut layer = doc.get_page(first_page).get_layer(first_layer);
    for (i, page) in pages.iter().enumerate() {
        if i > 0 {
            let (page_index, layer_index) = doc.add_page(width, height, "Letter");
            layer = doc.get_page(page_index).get_layer(layer_index);
        }

        for run in &page.runs {
            layer.use_text(run.text.as_str(), layout.font_size, Mm(run.x), Mm(run.y), &font);
        }
    }

    doc.save_to_bytes().map_err(|e| e.to_string())
}

/// Writes one PDF per recipient into an output directory.
#[derive(Debug, Clone)]
pub struct DocumentWriter {
    output_dir: PathBuf,
    layout: PageLayout,
}

impl DocumentWriter {
    pub fn new(output_dir: impl Into<PathBuf>, layout: PageLayout) -> Self {
        Self {
            output_dir: output_dir.into(),
            layout,
        }
    }

    /// Where the letter for `recipient` goes.
    pub fn destination(&self, recipient: &ValidatedRecipient) -> PathBuf {
        self.output_dir.join(output_file_name(recipient))
    }

    /// Lay out and save one letter, returning the written path.
    ///
    /// An existing file with the same name is replaced.
    pub fn write(&self, letter: &RenderedLetter, recipient: &ValidatedRecipient) -> DocumentResult<PathBuf> {
        let name = recipient.display_name();
        let path = self.destination(recipient);

        let title = format!("Award letter for {}", name);
        let bytes = render_pdf(&title, letter.as_str(), &self.layout).map_err(|message| {
            DocumentError::Render {
                recipient: name.clone(),
                message,
            }
        })?;

        persist(&bytes, &path).map_err(|source| DocumentError::Io {
            recipient: name,
            path: path.clone(),
            source,
        })?;

        Ok(path)
    }
}

/// Write to a temp file next to `path`, then rename over it.
///
/// The temp file is removed when dropped on any error path.
fn persist(bytes: &[u8], path: &Path) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
