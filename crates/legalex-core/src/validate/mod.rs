//! Structural plausibility checks for (term, definition) pairs.
//!
//! A valid term is a noun phrase, not a sentence or a fragment of one. Rather
//! than deny-listing every bad extraction, the checks look at the shape of the
//! term (how it starts, how it ends, what it contains); see [`rules`].

pub mod rules;

use regex::Regex;

use crate::error::{compile, Result};
use rules::{Rejection, TermTest, TermView, DEFINITION_RULES, NOUN_PHRASE_RULES};

/// Terms must be longer than this.
pub const TERM_MIN_CHARS: usize = 2;
pub const TERM_MAX_CHARS: usize = 60;
pub const DEFINITION_MIN_CHARS: usize = 5;
pub const DEFINITION_MAX_CHARS: usize = 2000;

enum CompiledTest {
    Structural(TermTest),
    Pattern(Regex),
}

pub struct StructuralValidator {
    term_rules: Vec<(CompiledTest, Rejection)>,
    definition_rules: Vec<(Regex, Rejection)>,
}

impl StructuralValidator {
    pub fn new() -> Result<Self> {
        let term_rules = NOUN_PHRASE_RULES
            .rules
            .iter()
            .map(|rule| {
                let test = match rule.test {
                    TermTest::Matches(pattern) => {
                        CompiledTest::Pattern(compile(NOUN_PHRASE_RULES.name, pattern)?)
                    }
                    other => CompiledTest::Structural(other),
                };
                Ok((test, rule.outcome))
            })
            .collect::<Result<Vec<_>>>()?;

        let definition_rules = DEFINITION_RULES
            .rules
            .iter()
            .map(|rule| Ok((compile(DEFINITION_RULES.name, rule.pattern)?, rule.outcome)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            term_rules,
            definition_rules,
        })
    }

    /// First noun-phrase rule the term violates, if any.
    #[must_use]
    pub fn term_rejection(&self, term: &str) -> Option<Rejection> {
        let view = TermView::new(term);
        if view.words.is_empty() {
            return Some(Rejection::TermTooShort);
        }

        self.term_rules.iter().find_map(|(test, outcome)| {
            let fired = match test {
                CompiledTest::Structural(t) => t.fires(&view),
                CompiledTest::Pattern(re) => re.is_match(&view.lower),
            };
            fired.then_some(*outcome)
        })
    }

    #[must_use]
    pub fn is_noun_phrase(&self, term: &str) -> bool {
        self.term_rejection(term).is_none()
    }

    #[must_use]
    pub fn definition_rejection(&self, definition: &str) -> Option<Rejection> {
        self.definition_rules
            .iter()
            .find(|(re, _)| re.is_match(definition))
            .map(|(_, outcome)| *outcome)
    }

    #[must_use]
    pub fn is_valid_definition(&self, definition: &str) -> bool {
        self.definition_rejection(definition).is_none()
    }

    /// Why a pair is rejected, or `None` when it is acceptable.
    #[must_use]
    pub fn check(&self, term: &str, definition: &str) -> Option<Rejection> {
        let term_len = term.chars().count();
        let def_len = definition.chars().count();

        if term_len <= TERM_MIN_CHARS {
            return Some(Rejection::TermTooShort);
        }
        if term_len > TERM_MAX_CHARS {
            return Some(Rejection::TermTooLong);
        }
        if def_len < DEFINITION_MIN_CHARS {
            return Some(Rejection::DefinitionTooShort);
        }
        if def_len > DEFINITION_MAX_CHARS {
            return Some(Rejection::DefinitionTooLong);
        }

        self.term_rejection(term)
            .or_else(|| self.definition_rejection(definition))
    }

    #[must_use]
    pub fn is_valid_term_definition(&self, term: &str, definition: &str) -> bool {
        match self.check(term, definition) {
            Some(reason) => {
                tracing::debug!(term = %truncate(term, 80), %reason, "rejecting definition candidate");
                false
            }
            None => true,
        }
    }
}

pub(crate) fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
