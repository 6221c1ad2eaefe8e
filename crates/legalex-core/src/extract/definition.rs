//! Term/definition spans.
//!
//! Three passes feed the validator:
//! - section-scoped term forms inside a discovered definitions section,
//!   each definition running up to the next term start of any form;
//! - a line scanner for terms set on their own line with the definition on
//!   the next line, introduced by a colon or dash;
//! - a looser document-wide "X means Y." scan at lower confidence.

use regex::{Captures, Regex};

use super::layout::SectionText;
use crate::canonical::Canonicalizer;
use crate::config::ExtractionConfig;
use crate::error::{compile, Result};
use crate::models::{Definition, ExtractionMethod, Page};
use crate::validate::rules::RuleTable;
use crate::validate::StructuralValidator;

pub const LINE_TERM_CONFIDENCE: f64 = 0.90;
pub const GENERAL_CONFIDENCE: f64 = 0.82;

/// Section headers introducing a definitions article. Case-insensitive.
pub const SECTION_HEADERS: &[&str] = &[
    r"Article\s*\(?\s*1\s*\)?\s*[–—:-]*\s*Definitions?",
    r"Article\s+One\s*[–—:-]*\s*Definitions",
    r"Definitions?\s*and\s*Interpretations?",
    r"Meaning\s+of\s+Terms",
    r"Interpretation\s+of\s+Terms",
    r"Interpretation\s+and\s+Application",
    r"Chapter\s+(?:\d+|One)\s*[–—:-]*\s*Definitions",
    r"Section\s+\d+\s*[–—:-]*\s*Definitions",
    r"Part\s+One\s*[–—:-]*\s*Definitions",
    r"\n\s*Definitions\s*\n",
    r"For\s+the\s+purposes?\s+of\s+this\s+(?:Law|Decree|Resolution)[,:]?\s+the\s+following",
    r"For\s+the\s+purposes\s+of\s+applying\s+the\s+provisions",
];

/// Optional list marker before a term: `1.`, `(a)`, or a bullet.
const LIST_MARKER: &str = r"^[ \t]*(?:(?:\d{1,2}[.)]|\([a-z0-9]{1,3}\)|[−–—•-])[ \t]*)?";

#[derive(Debug, Clone, Copy)]
pub struct TermForm {
    pub name: &'static str,
    /// Matches a term start; group `term` is the term. The definition begins
    /// at the end of the match.
    pub pattern: &'static str,
    pub confidence: f64,
    /// Three consecutive line breaks also end the definition.
    pub stops_at_blank_run: bool,
}

pub static TERM_FORMS: RuleTable<TermForm> = RuleTable {
    name: "term_forms",
    version: 1,
    rules: &[
        TermForm {
            name: "quoted colon",
            pattern: r#"["“](?P<term>[^"”\n]{2,60})["”][ \t]*[:–—][ \t]*"#,
            confidence: 0.95,
            stops_at_blank_run: true,
        },
        TermForm {
            name: "quoted means",
            pattern: r#"["“](?P<term>[^"”\n]{2,60})["”][ \t]+(?:means|shall\s+mean)\b[ \t]*"#,
            confidence: 0.95,
            stops_at_blank_run: true,
        },
        // A term alone at the start of a line may take its colon directly;
        // the term may wrap onto a second line.
        TermForm {
            name: "colon",
            pattern: r#"(?P<term>[A-Z][A-Za-z&(),"'’ \t]{0,80}?(?:\n[ \t]*[A-Za-z][A-Za-z&(),"'’ \t]{0,60}?)??)(?:[ \t]+[:–—]|:)[ \t]*"#,
            confidence: 0.90,
            stops_at_blank_run: false,
        },
        TermForm {
            name: "means",
            pattern: r#"(?P<term>[A-Z][A-Za-z&()"'’ \t]{0,80}?)[ \t]+(?:means|shall\s+mean)\b[ \t]*"#,
            confidence: 0.90,
            stops_at_blank_run: true,
        },
        TermForm {
            name: "refers to",
            pattern: r#"(?P<term>[A-Z][A-Za-z&()"'’ \t]{0,80}?)[ \t]+(?:refers\s+to|is\s+defined\s+as)\b[ \t]*"#,
            confidence: 0.90,
            stops_at_blank_run: true,
        },
    ],
};

/// Document-wide recall backstop; groups `term` and `definition`.
pub const GENERAL_FORMS: &[&str] = &[
    r"\b(?P<term>[A-Z][A-Za-z\s()]{2,50})\s+(?:means|shall\s+mean|mean|refers\s+to|shall\s+refer\s+to|is\s+defined\s+as|denotes)\s+(?P<definition>[^.]+\.)",
    r#"["“](?P<term>[^"”]{2,50})["”]\s+(?:means|shall\s+mean|refers\s+to|is\s+defined\s+as)\s+(?P<definition>[^.]+\.)"#,
];

struct CompiledForm {
    name: &'static str,
    start: Regex,
    confidence: f64,
    stops_at_blank_run: bool,
}

pub struct DefinitionScanner {
    section_headers: Vec<Regex>,
    means_density: Regex,
    colon_density: Regex,
    article_end: Regex,
    chapter_end: Regex,
    forms: Vec<CompiledForm>,
    article_stop: Regex,
    blank_run: Regex,
    general: Vec<Regex>,
    footers: Vec<Regex>,
    config: ExtractionConfig,
}

impl DefinitionScanner {
    pub fn new(config: &ExtractionConfig) -> Result<Self> {
        let section_headers = SECTION_HEADERS
            .iter()
            .map(|p| compile("definition section headers", &format!("(?i){p}")))
            .collect::<Result<Vec<_>>>()?;

        let forms = TERM_FORMS
            .rules
            .iter()
            .map(|form| {
                Ok(CompiledForm {
                    name: form.name,
                    start: compile(form.name, &format!("(?m){LIST_MARKER}{}", form.pattern))?,
                    confidence: form.confidence,
                    stops_at_blank_run: form.stops_at_blank_run,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let general = GENERAL_FORMS
            .iter()
            .map(|p| compile("general definition forms", p))
            .collect::<Result<Vec<_>>>()?;

        let footers = config
            .footer_patterns
            .iter()
            .map(|p| compile("footer_patterns", p))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            section_headers,
            means_density: compile("definition density", r"\b[A-Z][A-Za-z\s]{2,40}\s+means\s+")?,
            colon_density: compile("definition density", r"\b[A-Z][A-Za-z\s]{2,40}\s*:\s*[A-Z]")?,
            article_end: compile("section end", r"(?i)\n\s*Article\s*\(?\s*[2-9]\d*\s*\)?")?,
            chapter_end: compile("section end", r"(?i)\n\s*(?:Chapter|Section)\s+[2-9]")?,
            forms,
            article_stop: compile("definition end", r"(?i)\n\s*Article\s*\(?\s*\d")?,
            blank_run: compile("definition end", r"\n[ \t]*\n[ \t]*\n")?,
            general,
            footers,
            config: config.clone(),
        })
    }

    /// Page numbers among the first pages that open a definitions section,
    /// by explicit header or by density of definition-shaped lines.
    #[must_use]
    pub fn find_definition_sections(&self, pages: &[Page]) -> Vec<u32> {
        let mut found: Vec<u32> = pages
            .iter()
            .take(self.config.definition_scan_pages)
            .filter(|page| self.opens_section(page))
            .map(|page| page.page_number)
            .collect();
        found.sort_unstable();
        found.dedup();
        found
    }

    fn opens_section(&self, page: &Page) -> bool {
        if self.section_headers.iter().any(|re| re.is_match(&page.text)) {
            tracing::debug!(page = page.page_number, "definitions header found");
            return true;
        }

        let means = self.means_density.find_iter(&page.text).count();
        let colons = self.colon_density.find_iter(&page.text).count();
        let dense = means >= self.config.means_density_threshold || colons >= self.config.colon_density_threshold;
        if dense {
            tracing::debug!(page = page.page_number, means, colons, "definition-dense page");
        }
        dense
    }

    /// Text of the section opening on `start`, cut at the next numbered
    /// article (or chapter/section when no article follows).
    #[must_use]
    pub fn section_text(&self, pages: &[Page], start: u32) -> SectionText {
        let last = start.saturating_add(self.config.definition_section_span);
        let mut section = SectionText::assemble(
            pages
                .iter()
                .filter(|p| (start..=last).contains(&p.page_number)),
            &self.config,
        );

        let cut = self
            .article_end
            .find(&section.text)
            .or_else(|| self.chapter_end.find(&section.text))
            .map(|m| m.start());
        if let Some(cut) = cut {
            section.truncate(cut);
        }
        section
    }

    #[must_use]
    pub fn scan(&self, canonicalizer: &Canonicalizer, validator: &StructuralValidator, pages: &[Page]) -> Vec<Definition> {
        let mut definitions = Vec::new();

        for start in self.find_definition_sections(pages) {
            let section = self.section_text(pages, start);
            definitions.extend(self.scan_section(canonicalizer, validator, &section));
            definitions.extend(self.scan_lines(canonicalizer, validator, &section));
        }

        for page in pages {
            definitions.extend(self.scan_general(canonicalizer, validator, page));
        }

        definitions
    }

    /// Term forms inside one section. Each definition runs to the next term
    /// start of any form, a numbered article, or (for most forms) a run of
    /// blank lines.
    #[must_use]
    pub fn scan_section(
        &self,
        canonicalizer: &Canonicalizer,
        validator: &StructuralValidator,
        section: &SectionText,
    ) -> Vec<Definition> {
        let text = section.text.as_str();
        let mut starts: Vec<usize> = self
            .forms
            .iter()
            .flat_map(|form| form.start.find_iter(text).map(|m| m.start()))
            .collect();
        starts.sort_unstable();

        let mut definitions = Vec::new();
        for form in &self.forms {
            for caps in form.start.captures_iter(text) {
                let (Some(whole), Some(term)) = (caps.get(0), caps.name("term")) else {
                    continue;
                };

                let body_start = whole.end();
                let mut body_end = starts
                    .iter()
                    .copied()
                    .find(|&s| s >= body_start)
                    .unwrap_or(text.len());
                let tail = &text[body_start..body_end];
                if let Some(m) = self.article_stop.find(tail) {
                    body_end = body_start + m.start();
                }
                if form.stops_at_blank_run {
                    if let Some(m) = self.blank_run.find(&text[body_start..body_end]) {
                        body_end = body_start + m.start();
                    }
                }

                if let Some(def) = self.accept(
                    canonicalizer,
                    validator,
                    term.as_str(),
                    &text[body_start..body_end],
                    section.page_at(term.start()),
                    form.confidence,
                ) {
                    tracing::trace!(form = form.name, term = %def.term, "section definition");
                    definitions.push(def);
                }
            }
        }
        definitions
    }

    /// Terms alone on a short line, with the definition on the following
    /// lines introduced by a colon or dash.
    #[must_use]
    pub fn scan_lines(
        &self,
        canonicalizer: &Canonicalizer,
        validator: &StructuralValidator,
        section: &SectionText,
    ) -> Vec<Definition> {
        let mut offsets = Vec::new();
        let mut offset = 0;
        let lines: Vec<&str> = section
            .text
            .split('\n')
            .inspect(|line| {
                offsets.push(offset);
                offset += line.len() + 1;
            })
            .map(str::trim)
            .collect();

        let mut definitions = Vec::new();
        let mut i = 0;
        while i + 1 < lines.len() {
            if !is_line_term(lines[i]) || !lines[i + 1].starts_with([':', '−', '–']) {
                i += 1;
                continue;
            }

            let mut body = vec![lines[i + 1]];
            let mut j = i + 2;
            while j < lines.len() && !lines[j].is_empty() && !is_line_term(lines[j]) {
                body.push(lines[j]);
                j += 1;
            }

            if let Some(def) = self.accept(
                canonicalizer,
                validator,
                lines[i],
                &body.join(" "),
                section.page_at(offsets[i]),
                LINE_TERM_CONFIDENCE,
            ) {
                definitions.push(def);
            }
            i = j;
        }
        definitions
    }

    /// Document-wide "X means Y." forms on one page.
    #[must_use]
    pub fn scan_general(
        &self,
        canonicalizer: &Canonicalizer,
        validator: &StructuralValidator,
        page: &Page,
    ) -> Vec<Definition> {
        self.general
            .iter()
            .flat_map(|re| re.captures_iter(&page.text))
            .filter_map(|caps: Captures<'_>| {
                let term = caps.name("term")?;
                let body = caps.name("definition")?;
                self.accept(
                    canonicalizer,
                    validator,
                    term.as_str(),
                    body.as_str(),
                    page.page_number,
                    GENERAL_CONFIDENCE,
                )
            })
            .collect()
    }

    /// Trailing page-footer fragments removed from a definition.
    #[must_use]
    pub fn strip_footers(&self, definition: &str) -> String {
        self.footers.iter().fold(definition.to_string(), |text, re| {
            re.replace(&text, "").into_owned()
        })
    }

    fn accept(
        &self,
        canonicalizer: &Canonicalizer,
        validator: &StructuralValidator,
        raw_term: &str,
        raw_definition: &str,
        page: u32,
        confidence: f64,
    ) -> Option<Definition> {
        let term = canonicalizer.normalize_term(raw_term);
        let definition = canonicalizer.normalize_definition(raw_definition);
        let definition = canonicalizer.normalize_definition(&self.strip_footers(&definition));

        validator
            .is_valid_term_definition(&term, &definition)
            .then(|| Definition::new(term, definition, page, confidence, ExtractionMethod::Rule))
    }
}

/// A short capitalized line that is not itself a sentence or a heading.
fn is_line_term(line: &str) -> bool {
    let len = line.chars().count();
    (3..50).contains(&len)
        && line.chars().next().is_some_and(char::is_uppercase)
        && !line.ends_with('.')
        && !line.starts_with("Article")
        && !line.starts_with("Chapter")
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        scanner: DefinitionScanner,
        canon: Canonicalizer,
        validator: StructuralValidator,
    }

    fn fixture() -> Fixture {
        Fixture {
            scanner: DefinitionScanner::new(&ExtractionConfig::default()).unwrap(),
            canon: Canonicalizer::new().unwrap(),
            validator: StructuralValidator::new().unwrap(),
        }
    }

    impl Fixture {
        fn scan(&self, pages: &[Page]) -> Vec<Definition> {
            self.scanner.scan(&self.canon, &self.validator, pages)
        }
    }

    fn terms(defs: &[Definition]) -> Vec<&str> {
        defs.iter().map(|d| d.term.as_str()).collect()
    }

    #[test]
    fn colon_definitions_in_article_one() {
        let f = fixture();
        let pages = vec![Page::new(
            1,
            "Article (1) - Definitions\n\nMinistry: Ministry of Finance.\n\nAuthority: The Federal Tax Authority.",
        )];
        let defs = f.scan(&pages);
        let found = terms(&defs);
        assert!(found.contains(&"Ministry"), "{found:?}");
        assert!(found.contains(&"Authority"), "{found:?}");

        let ministry = defs.iter().find(|d| d.term == "Ministry").unwrap();
        assert_eq!(ministry.definition, "Ministry of Finance.");
        assert!((ministry.confidence - 0.90).abs() < 1e-9);
        assert!(defs.iter().all(|d| !d.definition.starts_with(char::is_lowercase)));
    }

    #[test]
    fn preamble_colon_is_not_a_term() {
        let f = fixture();
        let pages = vec![Page::new(
            1,
            "Article (1) - Definitions\nThe Cabinet:\nHaving reviewed the Constitution;\nState: The United Arab Emirates.",
        )];
        let found = f.scan(&pages);
        assert_eq!(terms(&found), vec!["State"]);
    }

    #[test]
    fn preamble_labels_before_definitions_header_are_dropped() {
        let f = fixture();
        let pages = vec![Page::new(
            1,
            "Cabinet Resolution No. (9) of 2020\nThe Cabinet:\nHaving reviewed:\n- The Constitution;\n\
             - Federal Law No. (1) of 1972 Concerning the Competencies of Ministries;\nHas resolved:\n\
             Article (1) - Definitions\nState: The United Arab Emirates.",
        )];
        let defs = f.scan(&pages);
        let found = terms(&defs);
        assert!(found.contains(&"State"), "{found:?}");
        for label in ["Having reviewed", "Has resolved", "The Cabinet"] {
            assert!(!found.contains(&label), "{label} in {found:?}");
        }
    }

    #[test]
    fn section_discovered_by_density() {
        let f = fixture();
        let text = "Person means any natural or legal person.\n\
                    Supply means the supply of goods or services.\n\
                    Tax Period means the period for which tax is payable.\n";
        let pages = vec![Page::new(1, "Preamble text."), Page::new(2, text)];
        assert_eq!(f.scanner.find_definition_sections(&pages), vec![2]);

        let defs = f.scan(&pages);
        let person = defs
            .iter()
            .find(|d| d.term == "Person" && (d.confidence - 0.90).abs() < 1e-9)
            .unwrap();
        assert_eq!(person.definition, "any natural or legal person.");
        assert_eq!(person.page, 2);
    }

    #[test]
    fn section_stops_at_next_article() {
        let f = fixture();
        let pages = vec![Page::new(
            1,
            "Article (1) - Definitions\nMinistry: Ministry of Finance.\nArticle (2) - Scope\nScope: This Law applies everywhere.",
        )];
        let section = f.scanner.section_text(&pages, 1);
        assert!(!section.text.contains("Scope"));
    }

    #[test]
    fn multi_page_section_attributes_pages() {
        let f = fixture();
        let pages = vec![
            Page::new(3, "Article (1) - Definitions\nMinistry: Ministry of Finance."),
            Page::new(4, "Authority: The Federal Tax Authority."),
        ];
        let defs = f.scan(&pages);
        let authority = defs.iter().find(|d| d.term == "Authority").unwrap();
        assert_eq!(authority.page, 4);
    }

    #[test]
    fn quoted_terms_score_higher() {
        let f = fixture();
        let pages = vec![Page::new(
            1,
            "Definitions and Interpretations\n“Taxable Person” means any person registered for Tax.\n",
        )];
        let defs = f.scan(&pages);
        assert!(defs
            .iter()
            .any(|d| d.term == "Taxable Person" && (d.confidence - 0.95).abs() < 1e-9));
    }

    #[test]
    fn term_on_its_own_line() {
        let f = fixture();
        let pages = vec![Page::new(
            1,
            "Article (1) - Definitions\nGovernment Entity\n: Any federal or local government body\nof the State\n\nLicence\n– The permit issued by the Authority",
        )];
        let defs = f.scan(&pages);
        let entity = defs.iter().find(|d| d.term == "Government Entity").unwrap();
        assert_eq!(entity.definition, "Any federal or local government body of the State.");
        assert!(terms(&defs).contains(&"Licence"));
    }

    #[test]
    fn general_scan_has_lower_confidence() {
        let f = fixture();
        let pages = vec![Page::new(
            7,
            "In this Chapter, Export means the movement of goods outside the State.",
        )];
        let defs = f.scan(&pages);
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].term, "Export");
        assert_eq!(defs[0].page, 7);
        assert!((defs[0].confidence - GENERAL_CONFIDENCE).abs() < 1e-9);
    }

    #[test]
    fn footer_fragments_are_removed() {
        let f = fixture();
        assert_eq!(
            f.scanner.strip_footers("The Federal Tax Authority Federal Decree-Law of 2022 on Corporate Tax."),
            "The Federal Tax Authority"
        );
    }

    #[test]
    fn fragments_are_dropped() {
        let f = fixture();
        let pages = vec![Page::new(
            1,
            "Article (1) - Definitions\nRegistrant shall notify : the Authority within 20 days.\nment: a fragment of a word.",
        )];
        assert!(f.scan(&pages).is_empty());
    }
}
