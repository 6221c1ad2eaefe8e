//! Citation spans: an ordered pattern table, match cleanup, title and running
//! header suppression, and confidence scoring.

use regex::Regex;

use super::layout::{context_window, document_title, strip_page_edges};
use crate::canonical::{collapse_whitespace, is_specific_id, Canonicalizer};
use crate::config::ExtractionConfig;
use crate::error::{compile, Result};
use crate::models::{Citation, ExtractionMethod, Page};
use crate::validate::rules::RuleTable;

#[derive(Debug, Clone, Copy)]
pub struct CitationPattern {
    pub name: &'static str,
    pub pattern: &'static str,
}

/// Citation templates, matched case-insensitively. The `[^.;]*` tails run to
/// the end of the clause so topic words ("on Excise Tax") stay attached.
pub static CITATION_PATTERNS: RuleTable<CitationPattern> = RuleTable {
    name: "citation",
    version: 1,
    rules: &[
        CitationPattern {
            name: "federal decree-law",
            pattern: r"Federal\s+Decree(?:[- ]?|\s+by\s+)Law\s+(?:No\.?\s*)?\(?\d+\)?\s+of\s+\d{4}[^.;]*",
        },
        CitationPattern {
            name: "cabinet resolution",
            pattern: r"Cabinet\s+Resolution\s+(?:No\.?\s*)?\(?\d+\)?\s+of\s+\d{4}[^.;]*",
        },
        CitationPattern {
            name: "federal law",
            pattern: r"Federal\s+Law\s+(?:No\.?\s*)?\(?\d+\)?\s+of\s+\d{4}[^.;]*",
        },
        CitationPattern {
            name: "federal law issuing",
            pattern: r"Federal\s+Law\s+No\.?\s*\(?\d+\)?\s+(?:Issuing|Promulgating)[^.;]*",
        },
        CitationPattern {
            name: "ministerial",
            pattern: r"Ministerial\s+(?:Resolution|Decision)\s+No\.?\s*\(?\d+\)?\s+of\s+\d{4}[^.;]*",
        },
        CitationPattern {
            name: "federal decree",
            pattern: r"Federal\s+Decree\s+No\.?\s*\(?\d+\)?\s+of\s+\d{4}[^.;]*",
        },
        CitationPattern {
            name: "as amended",
            pattern: r"(?:Federal\s+Decree(?:[- ]?|\s+by\s+)Law|Cabinet\s+Resolution|Federal\s+Law)\s+No\.?\s*\(?\d+\)?\s+of\s+\d{4},?\s+as\s+amended",
        },
        CitationPattern {
            name: "bulleted",
            pattern: r"[−–—•]\s*(?:Federal\s+Decree(?:[- ]?|\s+by\s+)Law|Cabinet\s+Resolution|Federal\s+Law)\s+No\.?\s*\(?\d+\)?\s+of\s+\d{4}[^.;]*",
        },
        CitationPattern {
            name: "decree-law",
            pattern: r"\bDecree[- ]?Law\s+No\.?\s*\(?\d+\)?\s+of\s+\d{4}[^.;]*",
        },
        CitationPattern {
            name: "topic",
            pattern: r"(?:Federal\s+Decree[- ]?Law|Cabinet\s+Resolution)\s+No\.?\s*\(?\d+\)?\s+of\s+\d{4}\s+(?:Regarding|Concerning|on)\b[^.;]*",
        },
    ],
};

pub const BASE_CONFIDENCE: f64 = 0.85;
pub const SIGNAL_BONUS: f64 = 0.05;

/// Text that, when it precedes a citation near the top of a page, shows the
/// citation belongs to the body rather than a running header.
pub const PREAMBLE_MARKERS: &[&str] = &[
    "The Cabinet",
    "We,",
    "Having reviewed",
    "Having perused",
    "Upon the proposal",
    "And based on",
];

pub struct CitationScanner {
    patterns: Vec<(&'static str, Regex)>,
    instrument: Regex,
    leading_bullet: Regex,
    trailing_and: Regex,
    number_spacing: Regex,
    of_spacing: Regex,
    signals: Vec<Regex>,
    config: ExtractionConfig,
}

impl CitationScanner {
    pub fn new(config: &ExtractionConfig) -> Result<Self> {
        let patterns = CITATION_PATTERNS
            .rules
            .iter()
            .map(|rule| Ok((rule.name, compile(rule.name, &format!("(?i){}", rule.pattern))?)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            patterns,
            instrument: compile(
                "instrument names",
                r"(?i)\b(?:Federal\s+Decree|Federal\s+Law|Cabinet\s+Resolution|Ministerial\s+(?:Resolution|Decision)|Decree[- ]?(?:by\s+)?Law)\b",
            )?,
            leading_bullet: compile("citation cleanup", r"^[−–—•-]\s*")?,
            trailing_and: compile("citation cleanup", r"(?i)(?:[;,]\s*)?\band$")?,
            number_spacing: compile("citation cleanup", r"(?i)\b(No)\.\s*\(")?,
            of_spacing: compile("citation cleanup", r"(?i)\)\s*(of)\b\s*")?,
            signals: vec![
                compile("citation signals", r"\(\d+\)")?,
                compile("citation signals", r"\d{4}")?,
                compile("citation signals", r"(?i)\b(?:concerning|on|regarding)\b")?,
            ],
            config: config.clone(),
        })
    }

    /// End of the clause matched at `start..end`: a tail that runs into the
    /// name of another instrument stops there.
    fn clause_end(&self, text: &str, start: usize, end: usize) -> usize {
        let span = &text[start..end];
        let Some(head) = span.find(|c: char| c.is_ascii_digit()) else {
            return end;
        };
        self.instrument
            .find(&span[head..])
            .map_or(end, |m| start + head + m.start())
    }

    /// Tidy a raw match: bullets, trailing conjunctions and list punctuation,
    /// and the spacing around `No. (` and `) of`.
    #[must_use]
    pub fn clean(&self, raw: &str) -> String {
        let mut text = collapse_whitespace(raw);
        text = self.leading_bullet.replace(&text, "").into_owned();

        loop {
            let trimmed = text.trim_end_matches([',', ';', ':', ' ']);
            let next = self.trailing_and.replace(trimmed, "").into_owned();
            if next == text {
                break;
            }
            text = next;
        }

        let text = self.number_spacing.replace_all(&text, "$1. (");
        let text = self.of_spacing.replace_all(&text, ") $1 ");
        text.trim().to_string()
    }

    /// 0.85 plus 0.05 for each of: a parenthesized number, a four-digit year,
    /// a topic word. Never above 1.0.
    #[must_use]
    pub fn confidence(&self, text: &str) -> f64 {
        self.signals
            .iter()
            .filter(|re| re.is_match(text))
            .fold(BASE_CONFIDENCE, |confidence, _| confidence + SIGNAL_BONUS)
            .min(1.0)
    }

    /// Canonical id of the instrument named in the document title, when the
    /// title names one specifically enough to compare against.
    #[must_use]
    pub fn title_id(&self, canonicalizer: &Canonicalizer, pages: &[Page]) -> Option<String> {
        let title = document_title(pages);
        let first = self
            .patterns
            .iter()
            .filter_map(|(_, re)| re.find(&title))
            .min_by_key(regex::Match::start)?;
        let end = self.clause_end(&title, first.start(), first.end());

        let id = canonicalizer.canonicalize_citation(&self.clean(&title[first.start()..end]));
        is_specific_id(&id).then_some(id)
    }

    /// A citation in the first few hundred bytes of a page with almost nothing
    /// before it is a running header, unless a preamble marker precedes it or
    /// it is a `;`-terminated list entry.
    #[must_use]
    pub fn is_header(&self, text: &str, start: usize, end: usize) -> bool {
        if start >= self.config.header_zone_chars {
            return false;
        }
        if text[end..].trim_start_matches([' ', '\t']).starts_with(';') {
            return false;
        }

        let before = text[..start].trim();
        if PREAMBLE_MARKERS.iter().any(|marker| before.contains(marker)) {
            return false;
        }
        before.chars().count() < self.config.header_prefix_max_chars
    }

    #[must_use]
    pub fn scan(&self, canonicalizer: &Canonicalizer, pages: &[Page]) -> Vec<Citation> {
        let title_id = self.title_id(canonicalizer, pages);
        let mut citations = Vec::new();

        for page in pages {
            let text = strip_page_edges(&page.text, &self.config);

            for (name, re) in &self.patterns {
                for m in re.find_iter(&text) {
                    let (start, end) = (m.start(), self.clause_end(&text, m.start(), m.end()));
                    let cleaned = self.clean(&text[start..end]);
                    let len = cleaned.chars().count();
                    if len < self.config.citation_min_chars || len > self.config.citation_max_chars {
                        tracing::debug!(pattern = name, len, page = page.page_number, "citation outside length bounds");
                        continue;
                    }

                    let confidence = self.confidence(&cleaned);
                    let citation =
                        Citation::new(canonicalizer, cleaned, page.page_number, confidence, ExtractionMethod::Rule);

                    if title_id.as_deref() == Some(citation.canonical_id()) {
                        tracing::debug!(id = citation.canonical_id(), "skipping title self-reference");
                        continue;
                    }
                    if self.is_header(&text, start, end) {
                        tracing::debug!(text = %citation.text, page = page.page_number, "skipping running header");
                        continue;
                    }

                    let context = context_window(&text, start, end, self.config.context_radius_chars);
                    citations.push(citation.with_context(context).with_position(start, end));
                }
            }
        }

        citations
    }
}
