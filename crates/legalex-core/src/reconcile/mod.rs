//! Merging candidate lists from several extraction passes into one
//! deduplicated, confidence-ranked list per record kind.

mod preference;
mod similarity;

pub use preference::{prefer_citation, prefer_definition, Preference, PREFERRED_MARKER};
pub use similarity::{
    Embedder, EmbeddingSimilarity, ExactSimilarity, FuzzySimilarity, SimilarityBackend, SimilarityError,
    SimilarityMethod, SimilarityOracle, SimilarityResult,
};

use std::cmp::Ordering;

use crate::canonical::is_specific_id;
use crate::config::ExtractionConfig;
use crate::models::{Citation, Definition};

pub struct Reconciler {
    oracle: SimilarityOracle,
    citation_threshold: f64,
    definition_threshold: f64,
    citation_preference: Preference<Citation>,
    definition_preference: Preference<Definition>,
}

impl Reconciler {
    #[must_use]
    pub fn new(oracle: SimilarityOracle, config: &ExtractionConfig) -> Self {
        Self {
            oracle,
            citation_threshold: config.citation_overlap_threshold,
            definition_threshold: config.definition_overlap_threshold,
            citation_preference: prefer_citation,
            definition_preference: prefer_definition,
        }
    }

    #[must_use]
    pub fn with_citation_preference(mut self, preference: Preference<Citation>) -> Self {
        self.citation_preference = preference;
        self
    }

    #[must_use]
    pub fn with_definition_preference(mut self, preference: Preference<Definition>) -> Self {
        self.definition_preference = preference;
        self
    }

    #[must_use]
    pub fn oracle(&self) -> &SimilarityOracle {
        &self.oracle
    }

    /// Same canonical id, or similar enough text. Two ids that each name a
    /// specific instrument and differ are never the same citation, however
    /// alike their wording.
    #[must_use]
    pub fn citations_overlap(&self, a: &Citation, b: &Citation) -> bool {
        if a.canonical_id() == b.canonical_id() {
            return true;
        }
        if is_specific_id(a.canonical_id()) && is_specific_id(b.canonical_id()) {
            return false;
        }
        self.oracle.similarity(&a.text, &b.text) > self.citation_threshold
    }

    #[must_use]
    pub fn definitions_overlap(&self, a: &Definition, b: &Definition) -> bool {
        a.key() == b.key() || self.oracle.similarity(&a.term, &b.term) > self.definition_threshold
    }

    /// The rule-based list is the baseline. An AI candidate that overlaps an
    /// accumulated record competes with it under the citation preference;
    /// one that overlaps nothing is appended.
    #[must_use]
    pub fn merge_citations(&self, rule: Vec<Citation>, ai: Vec<Citation>) -> Vec<Citation> {
        tracing::info!(rule = rule.len(), ai = ai.len(), "merging citations");
        let merged = absorb(rule, ai, |a, b| self.citations_overlap(a, b), self.citation_preference);
        let merged = self.dedup_citations(merged);
        tracing::info!(unique = merged.len(), "merged citations");
        merged
    }

    #[must_use]
    pub fn merge_definitions(&self, rule: Vec<Definition>, ai: Vec<Definition>) -> Vec<Definition> {
        tracing::info!(rule = rule.len(), ai = ai.len(), "merging definitions");
        let merged = absorb(rule, ai, |a, b| self.definitions_overlap(a, b), self.definition_preference);
        let merged = self.dedup_definitions(merged);
        tracing::info!(unique = merged.len(), "merged definitions");
        merged
    }

    /// Collapse overlapping citations, then sort by confidence, descending.
    /// The sort is stable, so equal confidences keep their first-seen order.
    #[must_use]
    pub fn dedup_citations(&self, citations: Vec<Citation>) -> Vec<Citation> {
        let mut unique = absorb(Vec::new(), citations, |a, b| self.citations_overlap(a, b), self.citation_preference);
        unique.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        unique
    }

    #[must_use]
    pub fn dedup_definitions(&self, definitions: Vec<Definition>) -> Vec<Definition> {
        let mut unique = absorb(Vec::new(), definitions, |a, b| self.definitions_overlap(a, b), self.definition_preference);
        unique.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        unique
    }
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new(SimilarityOracle::default(), &ExtractionConfig::default())
    }
}

/// Fold `incoming` into `base`. An incoming record that overlaps an existing
/// one replaces it in place when preferred and is dropped otherwise.
fn absorb<T>(
    mut base: Vec<T>,
    incoming: Vec<T>,
    overlaps: impl Fn(&T, &T) -> bool,
    preference: Preference<T>,
) -> Vec<T> {
    for candidate in incoming {
        match base.iter().position(|existing| overlaps(existing, &candidate)) {
            Some(i) => {
                if preference(&candidate, &base[i]) == Ordering::Greater {
                    base[i] = candidate;
                }
            }
            None => base.push(candidate),
        }
    }
    base
}
