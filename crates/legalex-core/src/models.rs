use serde::{Deserialize, Serialize};

use crate::canonical::Canonicalizer;

/// One physical page of extracted text, 1-indexed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub page_number: u32,
    pub text: String,
}

impl Page {
    #[must_use]
    pub fn new(page_number: u32, text: impl Into<String>) -> Self {
        Self {
            page_number,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    Rule,
    Ai,
}

impl ExtractionMethod {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rule => "rule",
            Self::Ai => "ai",
        }
    }
}

impl std::fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub(crate) fn clamp_confidence(confidence: f64) -> f64 {
    if confidence.is_nan() {
        0.0
    } else {
        confidence.clamp(0.0, 1.0)
    }
}

/// A reference to another legal instrument.
///
/// `canonical_id` is always derived from `text` by the [`Canonicalizer`];
/// two citations with equal ids denote the same instrument.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Citation {
    pub text: String,
    canonical_id: String,
    pub page: u32,
    pub confidence: f64,
    pub extraction_method: ExtractionMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<(usize, usize)>,
}

impl Citation {
    #[must_use]
    pub fn new(
        canonicalizer: &Canonicalizer,
        text: impl Into<String>,
        page: u32,
        confidence: f64,
        extraction_method: ExtractionMethod,
    ) -> Self {
        let text = text.into();
        let canonical_id = canonicalizer.canonicalize_citation(&text);
        Self {
            text,
            canonical_id,
            page,
            confidence: clamp_confidence(confidence),
            extraction_method,
            context: None,
            position: None,
        }
    }

    #[must_use]
    pub fn with_context(mut self, context: String) -> Self {
        self.context = Some(context);
        self
    }

    #[must_use]
    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }

    #[must_use]
    pub fn canonical_id(&self) -> &str {
        &self.canonical_id
    }
}

/// A term and its definition. Identity is the lowercased, trimmed term;
/// `term` keeps the display casing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Definition {
    pub term: String,
    pub definition: String,
    pub page: u32,
    pub confidence: f64,
    pub extraction_method: ExtractionMethod,
}

impl Definition {
    #[must_use]
    pub fn new(
        term: impl Into<String>,
        definition: impl Into<String>,
        page: u32,
        confidence: f64,
        extraction_method: ExtractionMethod,
    ) -> Self {
        Self {
            term: term.into(),
            definition: definition.into(),
            page,
            confidence: clamp_confidence(confidence),
            extraction_method,
        }
    }

    #[must_use]
    pub fn key(&self) -> String {
        term_key(&self.term)
    }
}

#[must_use]
pub fn term_key(term: &str) -> String {
    term.trim().to_lowercase()
}

/// Citation as supplied by an external pass. Any `canonical_id` it carries
/// is discarded and re-derived.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawCitation {
    pub text: String,
    #[serde(default = "default_page")]
    pub page: u32,
    pub confidence: f64,
    #[serde(default, skip_serializing)]
    pub canonical_id: Option<String>,
}

impl RawCitation {
    #[must_use]
    pub fn into_citation(self, canonicalizer: &Canonicalizer, method: ExtractionMethod) -> Citation {
        Citation::new(canonicalizer, self.text, self.page, self.confidence, method)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawDefinition {
    pub term: String,
    pub definition: String,
    #[serde(default = "default_page")]
    pub page: u32,
    pub confidence: f64,
}

impl RawDefinition {
    #[must_use]
    pub fn into_definition(self, method: ExtractionMethod) -> Definition {
        Definition::new(self.term, self.definition, self.page, self.confidence, method)
    }
}

const fn default_page() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn citation_id_is_derived() {
        let canon = Canonicalizer::new().unwrap();
        let c = Citation::new(
            &canon,
            "Cabinet Resolution No. (37) of 2017",
            3,
            0.9,
            ExtractionMethod::Rule,
        );
        assert_eq!(c.canonical_id(), "cabinet_resolution_37_2017");
    }

    #[test]
    fn confidence_is_clamped() {
        let d = Definition::new("Tax", "A levy.", 1, 1.7, ExtractionMethod::Ai);
        assert!((d.confidence - 1.0).abs() < f64::EPSILON);
        let d = Definition::new("Tax", "A levy.", 1, f64::NAN, ExtractionMethod::Ai);
        assert!(d.confidence.abs() < f64::EPSILON);
    }

    #[test]
    fn raw_citation_ignores_supplied_id() {
        let canon = Canonicalizer::new().unwrap();
        let raw: RawCitation = serde_json::from_str(
            r#"{"text": "Federal Law No. (1) of 1972", "confidence": 0.8, "canonical_id": "bogus"}"#,
        )
        .unwrap();
        let c = raw.into_citation(&canon, ExtractionMethod::Ai);
        assert_eq!(c.canonical_id(), "federal_law_1_1972");
        assert_eq!(c.page, 1);
    }

    #[test]
    fn method_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&ExtractionMethod::Ai).unwrap(), "\"ai\"");
        assert_eq!(ExtractionMethod::Rule.to_string(), "rule");
    }

    #[test]
    fn term_key_folds_case() {
        let d = Definition::new("  Tax Period ", "x", 1, 0.5, ExtractionMethod::Rule);
        assert_eq!(d.key(), "tax period");
    }
}
