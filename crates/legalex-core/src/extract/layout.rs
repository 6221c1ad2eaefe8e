//! Page-layout heuristics: running header/footer removal, title detection and
//! multi-page section assembly.

use crate::config::ExtractionConfig;
use crate::models::Page;

/// Drop running headers and footers from a page.
///
/// Pages shorter than `min_lines_for_edge_strip` are returned untouched. Up to
/// three leading lines are dropped while they are short and carry no terminal
/// punctuation; up to three trailing lines are dropped while they are a bare
/// page number or very short.
#[must_use]
pub fn strip_page_edges(text: &str, config: &ExtractionConfig) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    if lines.len() < config.min_lines_for_edge_strip {
        return text.to_string();
    }

    let mut start = 0;
    for (i, line) in lines.iter().take(config.edge_scan_lines).enumerate() {
        let line = line.trim();
        let is_header = line.chars().count() < config.header_line_max_chars
            && !line.ends_with(['.', ';', ':']);
        if !is_header {
            break;
        }
        start = i + 1;
    }

    let mut end = lines.len();
    let floor = lines.len().saturating_sub(config.edge_scan_lines);
    for i in (floor..lines.len()).rev() {
        if i < start {
            break;
        }
        let line = lines[i].trim();
        let is_page_number = !line.is_empty() && line.chars().all(|c| c.is_ascii_digit());
        if is_page_number || line.chars().count() < config.footer_line_max_chars {
            end = i;
        } else {
            break;
        }
    }

    lines[start..end].join("\n")
}

/// The first few meaningful lines of the first page, joined with spaces.
///
/// Bullets and `;`-terminated list entries are never part of a title.
#[must_use]
pub fn document_title(pages: &[Page]) -> String {
    let Some(first) = pages.first() else {
        return String::new();
    };

    first
        .text
        .split('\n')
        .take(5)
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with(['−', '•']) && !line.ends_with(';'))
        .take(3)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text of several consecutive pages joined together, remembering where each
/// page begins so offsets can be mapped back to page numbers.
#[derive(Debug, Clone, Default)]
pub struct SectionText {
    pub text: String,
    page_starts: Vec<(usize, u32)>,
}

impl SectionText {
    #[must_use]
    pub fn assemble<'a>(pages: impl IntoIterator<Item = &'a Page>, config: &ExtractionConfig) -> Self {
        let mut section = Self::default();
        for page in pages {
            section.page_starts.push((section.text.len(), page.page_number));
            section.text.push_str(&strip_page_edges(&page.text, config));
            section.text.push('\n');
        }
        section
    }

    /// Page on which the byte at `offset` sits.
    #[must_use]
    pub fn page_at(&self, offset: usize) -> u32 {
        self.page_starts
            .iter()
            .take_while(|(start, _)| *start <= offset)
            .last()
            .or_else(|| self.page_starts.first())
            .map_or(1, |(_, page)| *page)
    }

    pub fn truncate(&mut self, len: usize) {
        self.text.truncate(len);
    }
}

/// Up to `radius` bytes either side of `start..end`, snapped to char
/// boundaries and whitespace-collapsed.
#[must_use]
pub fn context_window(text: &str, start: usize, end: usize, radius: usize) -> String {
    let mut from = start.saturating_sub(radius);
    while !text.is_char_boundary(from) {
        from -= 1;
    }
    let mut to = (end + radius).min(text.len());
    while !text.is_char_boundary(to) {
        to += 1;
    }
    crate::canonical::collapse_whitespace(&text[from..to])
}
