//! Canonical identities for citations and cleanup of raw term/definition spans.
//!
//! A citation's identity is `{type}_{number}_{year}`. The type tag comes from
//! the first rule in [`DOCUMENT_TYPE_RULES`] that matches, so the order of that
//! table decides what e.g. "Federal Decree-Law" resolves to.

use regex::Regex;

use crate::error::{compile, Result};

/// Ordered document-type rules: `(pattern, tag)`. Most specific phrasing first.
pub const DOCUMENT_TYPE_RULES: &[(&str, &str)] = &[
    (r"(?i)\bFederal\s+Decree[- ]?(?:by\s+)?Law\b", "fed_decree_law"),
    (r"(?i)\bDecree[- ]?(?:by\s+)?Law\b", "fed_decree_law"),
    (r"(?i)\bFederal\s+Law\b", "federal_law"),
    (r"(?i)\bCabinet\s+Resolution\b", "cabinet_resolution"),
    (r"(?i)\bMinisterial\s+(?:Resolution|Decision)\b", "ministerial_resolution"),
    (r"(?i)\bFederal\s+Decree\b", "federal_decree"),
];

pub const UNKNOWN_TYPE: &str = "unknown";
pub const DEFAULT_NUMBER: &str = "0";
pub const DEFAULT_YEAR: &str = "0000";

/// Definitions longer than this without terminal punctuation get a period.
pub const SENTENCE_MIN_CHARS: usize = 20;

const TERM_EDGE_PUNCT: &[char] = &[':', '.', ',', ';', '-', '—', '–'];
const QUOTE_CHARS: &[char] = &['"', '\'', '“', '”', '‘', '’'];
const DEFINITION_LEAD_PUNCT: &[char] = &[':', ',', ';', '-', '—', '–', '−'];
const DEFINITION_TAIL_PUNCT: &[char] = &[',', ';', ':'];

pub struct Canonicalizer {
    type_rules: Vec<(Regex, &'static str)>,
    number: Regex,
    year: Regex,
    hyphen_break: Regex,
    non_word: Regex,
}

impl Canonicalizer {
    pub fn new() -> Result<Self> {
        let type_rules = DOCUMENT_TYPE_RULES
            .iter()
            .map(|(pattern, tag)| Ok((compile("document type rules", pattern)?, *tag)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            type_rules,
            number: compile("citation number", r"(?i)\bNo\.?\s*\(?\s*(\d+)\s*\)?")?,
            year: compile("citation year", r"(?i)\bof\s+(\d{4})\b")?,
            hyphen_break: compile("hyphenated line break", r"-[ \t]*\r?\n\s*")?,
            non_word: compile("filename slug", r"[^\w\s]")?,
        })
    }

    /// Document-type tag for a raw citation, or `"unknown"`.
    #[must_use]
    pub fn document_type(&self, text: &str) -> &'static str {
        self.type_rules
            .iter()
            .find(|(re, _)| re.is_match(text))
            .map_or(UNKNOWN_TYPE, |(_, tag)| *tag)
    }

    #[must_use]
    pub fn canonicalize_citation(&self, text: &str) -> String {
        let doc_type = self.document_type(text);

        let number = self
            .number
            .captures(text)
            .and_then(|c| c.get(1))
            .map_or(DEFAULT_NUMBER, |m| m.as_str());

        let year = self
            .year
            .captures(text)
            .and_then(|c| c.get(1))
            .map_or(DEFAULT_YEAR, |m| m.as_str());

        let canonical_id = format!("{doc_type}_{number}_{year}");
        tracing::trace!(text, %canonical_id, "canonicalized citation");
        canonical_id
    }

    /// Join words split across lines by a trailing hyphen ("Stock-\npiler").
    #[must_use]
    pub fn dehyphenate(&self, text: &str) -> String {
        self.hyphen_break.replace_all(text, "").into_owned()
    }

    #[must_use]
    pub fn normalize_term(&self, raw: &str) -> String {
        let mut current = collapse_whitespace(&self.dehyphenate(raw));
        loop {
            let next = strip_term_edges(&current);
            if next == current {
                return current;
            }
            current = next;
        }
    }

    #[must_use]
    pub fn normalize_definition(&self, raw: &str) -> String {
        let mut current = collapse_whitespace(&self.dehyphenate(raw));
        loop {
            let next = current
                .trim_start_matches(DEFINITION_LEAD_PUNCT)
                .trim_end_matches(DEFINITION_TAIL_PUNCT)
                .trim()
                .to_string();
            if next == current {
                break;
            }
            current = next;
        }

        let needs_period = current
            .chars()
            .last()
            .is_some_and(|c| !matches!(c, '.' | '!' | '?'));
        if needs_period && current.chars().count() > SENTENCE_MIN_CHARS {
            current.push('.');
        }
        current
    }

    /// Document id for a source file: its citation identity when the name is
    /// a recognizable citation, otherwise a snake_case slug of the name.
    #[must_use]
    pub fn generate_doc_id_from_filename(&self, filename: &str) -> String {
        let name = strip_pdf_extension(filename);
        let canonical_id = self.canonicalize_citation(name);
        if !canonical_id.starts_with(UNKNOWN_TYPE) {
            return canonical_id;
        }

        let cleaned = self.non_word.replace_all(name, "");
        cleaned
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("_")
            .to_lowercase()
    }
}

/// Whether a canonical id names one instrument: known type, a number and a
/// year. Partial ids such as `cabinet_resolution_0_0000` do not.
#[must_use]
pub fn is_specific_id(canonical_id: &str) -> bool {
    let mut parts = canonical_id.rsplitn(3, '_');
    let year = parts.next();
    let number = parts.next();
    let doc_type = parts.next();
    doc_type.is_some_and(|t| t != UNKNOWN_TYPE)
        && number.is_some_and(|n| n != DEFAULT_NUMBER)
        && year.is_some_and(|y| y != DEFAULT_YEAR)
}

fn strip_term_edges(term: &str) -> String {
    let stripped = term
        .trim_end_matches(TERM_EDGE_PUNCT)
        .trim_start_matches(TERM_EDGE_PUNCT)
        .trim_matches(QUOTE_CHARS);
    let stripped = stripped.strip_prefix("The ").unwrap_or(stripped);
    stripped.trim().to_string()
}

fn strip_pdf_extension(filename: &str) -> &str {
    let len = filename.len();
    if len >= 4 && filename.is_char_boundary(len - 4) && filename[len - 4..].eq_ignore_ascii_case(".pdf") {
        &filename[..len - 4]
    } else {
        filename
    }
}

#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
