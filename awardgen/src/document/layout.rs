//! Page layout for letters: word wrapping, justification, pagination.
//!
//! All measurements are in millimetres with the PDF origin at the bottom
//! left of the page. Text is set in a monospaced face, so the advance of
//! every character is the same and line widths are exact.

use serde::{Deserialize, Serialize};

const PT_TO_MM: f32 = 25.4 / 72.0;

/// Courier advance width, in em.
const COURIER_ADVANCE: f32 = 0.6;

/// Page geometry and type settings, fixed for a whole document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageLayout {
    pub page_width: f32,
    pub page_height: f32,
    pub margin: f32,
    /// Font size in points.
    pub font_size: f32,
    /// Line height as a multiple of the font size.
    pub line_spacing: f32,
}

impl Default for PageLayout {
    /// A4 with one-inch margins, 12pt text.
    fn default() -> Self {
        Self {
            page_width: 210.0,
            page_height: 297.0,
            margin: 25.4,
            font_size: 12.0,
            line_spacing: 1.2,
        }
    }
}

impl PageLayout {
    pub fn content_width(&self) -> f32 {
        self.page_width - 2.0 * self.margin
    }

    pub fn char_width(&self) -> f32 {
        self.font_size * COURIER_ADVANCE * PT_TO_MM
    }

    pub fn line_height(&self) -> f32 {
        self.font_size * self.line_spacing * PT_TO_MM
    }

    /// Characters that fit on one line.
    pub fn columns(&self) -> usize {
        ((self.content_width() / self.char_width()).floor() as usize).max(1)
    }

    pub fn lines_per_page(&self) -> usize {
        let usable = self.page_height - 2.0 * self.margin;
        ((usable / self.line_height()).floor() as usize).max(1)
    }
}

/// One word placed on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub x: f32,
    /// Baseline.
    pub y: f32,
}

/// Everything drawn on one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageContent {
    pub runs: Vec<TextRun>,
}

/// Lay out a letter. Always returns at least one page.
///
/// Each input line is a paragraph. Paragraphs are wrapped to the content
/// width; every wrapped line except a paragraph's last is justified. Blank
/// input lines leave a blank line.
pub fn lay_out(text: &str, layout: &PageLayout) -> Vec<PageContent> {
    let columns = layout.columns();
    let per_page = layout.lines_per_page();
    let top = layout.page_height - layout.margin;

    let mut pages = vec![PageContent::default()];
    let mut slot = 0usize;

    for paragraph in text.lines() {
        let lines = wrap_words(paragraph, columns);
        if lines.is_empty() {
            slot += 1;
            continue;
        }

        let last = lines.len() - 1;
        for (i, words) in lines.iter().enumerate() {
            let page = slot / per_page;
            let row = slot % per_page;
            while pages.len() <= page {
                pages.push(PageContent::default());
            }

            let y = top - (row as f32 + 1.0) * layout.line_height();
            for (offset, word) in place_words(words, i < last, layout) {
                pages[page].runs.push(TextRun {
                    text: word.to_string(),
                    x: layout.margin + offset,
                    y,
                });
            }
            slot += 1;
        }
    }

    pages
}

/// Greedy word wrap to `columns` characters.
///
/// Words longer than a whole line are broken across lines.
pub fn wrap_words(paragraph: &str, columns: usize) -> Vec<Vec<String>> {
    let columns = columns.max(1);
    let mut lines = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut width = 0usize;

    for word in paragraph.split_whitespace() {
        for piece in split_long_word(word, columns) {
            let len = piece.chars().count();
            if !current.is_empty() && width + 1 + len > columns {
                lines.push(std::mem::take(&mut current));
                width = 0;
            }
            width = if current.is_empty() { len } else { width + 1 + len };
            current.push(piece);
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Horizontal offsets of each word from the left margin.
///
/// A justified line spreads the leftover width evenly over its gaps so the
/// last word ends on the right margin. A single word is never stretched.
pub fn place_words<'a>(words: &'a [String], justify: bool, layout: &PageLayout) -> Vec<(f32, &'a str)> {
    let cw = layout.char_width();
    let gaps = words.len().saturating_sub(1);
    let text_chars: usize = words.iter().map(|w| w.chars().count()).sum();

    let gap = if justify && gaps > 0 {
        (layout.content_width() - text_chars as f32 * cw) / gaps as f32
    } else {
        cw
    };

    let mut x = 0.0;
    let mut placed = Vec::with_capacity(words.len());
    for word in words {
        placed.push((x, word.as_str()));
        x += word.chars().count() as f32 * cw + gap;
    }
    placed
}

fn split_long_word(word: &str, columns: usize) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    chars.chunks(columns).map(|c| c.iter().collect()).collect()
}
