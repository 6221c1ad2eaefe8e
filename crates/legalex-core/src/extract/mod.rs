mod citation;
mod definition;
mod layout;

pub use citation::{CitationPattern, CitationScanner, BASE_CONFIDENCE, CITATION_PATTERNS, PREAMBLE_MARKERS, SIGNAL_BONUS};
pub use definition::{
    DefinitionScanner, TermForm, GENERAL_CONFIDENCE, GENERAL_FORMS, LINE_TERM_CONFIDENCE, SECTION_HEADERS, TERM_FORMS,
};
pub use layout::{context_window, document_title, strip_page_edges, SectionText};

use serde::Serialize;

use crate::canonical::Canonicalizer;
use crate::config::ExtractionConfig;
use crate::error::Result;
use crate::models::{Citation, Definition, Page};
use crate::validate::StructuralValidator;

/// Candidates produced by one extraction pass over a document.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractionOutput {
    pub citations: Vec<Citation>,
    pub definitions: Vec<Definition>,
}

impl ExtractionOutput {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.citations.is_empty() && self.definitions.is_empty()
    }
}

/// The rule-based pass: citation and definition scanners sharing one
/// canonicalizer and validator. All patterns are compiled by [`new`](Self::new);
/// extraction itself cannot fail.
pub struct PatternExtractor {
    canonicalizer: Canonicalizer,
    validator: StructuralValidator,
    citations: CitationScanner,
    definitions: DefinitionScanner,
}

impl PatternExtractor {
    pub fn new(config: &ExtractionConfig) -> Result<Self> {
        Ok(Self {
            canonicalizer: Canonicalizer::new()?,
            validator: StructuralValidator::new()?,
            citations: CitationScanner::new(config)?,
            definitions: DefinitionScanner::new(config)?,
        })
    }

    #[must_use]
    pub fn canonicalizer(&self) -> &Canonicalizer {
        &self.canonicalizer
    }

    #[must_use]
    pub fn validator(&self) -> &StructuralValidator {
        &self.validator
    }

    #[must_use]
    pub fn extract_citations(&self, pages: &[Page]) -> Vec<Citation> {
        self.citations.scan(&self.canonicalizer, pages)
    }

    #[must_use]
    pub fn find_definition_sections(&self, pages: &[Page]) -> Vec<u32> {
        self.definitions.find_definition_sections(pages)
    }

    #[must_use]
    pub fn extract_definitions(&self, pages: &[Page]) -> Vec<Definition> {
        self.definitions.scan(&self.canonicalizer, &self.validator, pages)
    }

    #[must_use]
    pub fn extract(&self, pages: &[Page]) -> ExtractionOutput {
        let output = ExtractionOutput {
            citations: self.extract_citations(pages),
            definitions: self.extract_definitions(pages),
        };
        tracing::debug!(
            pages = pages.len(),
            citations = output.citations.len(),
            definitions = output.definitions.len(),
            "rule pass complete"
        );
        output
    }
}
