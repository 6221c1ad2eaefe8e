use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{Citation, Definition, ExtractionMethod};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Citation,
    Definition,
}

impl EntityKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Citation => "citation",
            Self::Definition => "definition",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    Pending,
}

/// A final record a person should look at before it is trusted.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewItem {
    pub entity_id: String,
    pub entity_type: EntityKind,
    pub doc_id: String,
    /// Citation text or defined term.
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    pub page: u32,
    pub confidence: f64,
    pub extraction_method: ExtractionMethod,
    pub reason: String,
    pub status: ReviewStatus,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReviewSummary {
    pub total: usize,
    pub citations: usize,
    pub definitions: usize,
}

/// Collects low-confidence records across documents.
#[derive(Debug, Clone)]
pub struct ReviewQueue {
    threshold: f64,
    items: Vec<ReviewItem>,
}

impl ReviewQueue {
    #[must_use]
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            items: Vec::new(),
        }
    }

    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Queue every record of one document whose confidence is below the
    /// threshold. Returns how many were added.
    pub fn check(&mut self, doc_id: &str, citations: &[Citation], definitions: &[Definition]) -> usize {
        let before = self.items.len();
        let threshold = self.threshold;

        for citation in citations.iter().filter(|c| c.confidence < threshold) {
            self.push(
                EntityKind::Citation,
                doc_id,
                citation.text.clone(),
                None,
                citation.page,
                citation.confidence,
                citation.extraction_method,
            );
        }
        for definition in definitions.iter().filter(|d| d.confidence < threshold) {
            self.push(
                EntityKind::Definition,
                doc_id,
                definition.term.clone(),
                Some(definition.definition.clone()),
                definition.page,
                definition.confidence,
                definition.extraction_method,
            );
        }

        self.items.len() - before
    }

    #[allow(clippy::too_many_arguments)]
    fn push(
        &mut self,
        kind: EntityKind,
        doc_id: &str,
        text: String,
        definition: Option<String>,
        page: u32,
        confidence: f64,
        extraction_method: ExtractionMethod,
    ) {
        let item = ReviewItem {
            entity_id: format!("{}_{}", kind.as_str(), self.items.len()),
            entity_type: kind,
            doc_id: doc_id.to_string(),
            text,
            definition,
            page,
            confidence,
            extraction_method,
            reason: format!("Low confidence ({confidence:.2})"),
            status: ReviewStatus::Pending,
            added_at: Utc::now(),
        };
        tracing::debug!(id = %item.entity_id, reason = %item.reason, "queued for review");
        self.items.push(item);
    }

    #[must_use]
    pub fn items(&self) -> &[ReviewItem] {
        &self.items
    }

    #[must_use]
    pub fn into_items(self) -> Vec<ReviewItem> {
        self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn summary(&self) -> ReviewSummary {
        let citations = self
            .items
            .iter()
            .filter(|i| i.entity_type == EntityKind::Citation)
            .count();
        ReviewSummary {
            total: self.items.len(),
            citations,
            definitions: self.items.len() - citations,
        }
    }
}

impl Default for ReviewQueue {
    fn default() -> Self {
        Self::new(crate::config::REVIEW_THRESHOLD)
    }
}
