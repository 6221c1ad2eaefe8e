use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Instant;

use crate::config::ExtractionConfig;
use crate::error::{Error, Result};
use crate::extract::PatternExtractor;
use crate::models::{Citation, Definition, ExtractionMethod, Page, RawCitation, RawDefinition};
use crate::reconcile::{Embedder, Reconciler, SimilarityOracle};

/// Doc id used when a document arrives without a name.
pub const UNNAMED_DOCUMENT: &str = "untitled";

/// One document's page text plus any candidates an external AI pass has
/// already produced for it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentInput {
    #[serde(default)]
    pub name: String,
    pub pages: Vec<Page>,
    #[serde(default)]
    pub ai_citations: Vec<RawCitation>,
    #[serde(default)]
    pub ai_definitions: Vec<RawDefinition>,
}

impl DocumentInput {
    #[must_use]
    pub fn new(name: impl Into<String>, pages: Vec<Page>) -> Self {
        Self {
            name: name.into(),
            pages,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_ai_citations(mut self, citations: Vec<RawCitation>) -> Self {
        self.ai_citations = citations;
        self
    }

    #[must_use]
    pub fn with_ai_definitions(mut self, definitions: Vec<RawDefinition>) -> Self {
        self.ai_definitions = definitions;
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentMetadata {
    pub pages: usize,
    pub processing_date: DateTime<Utc>,
    pub processing_time_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentResult {
    pub doc_id: String,
    pub source_filename: String,
    pub metadata: DocumentMetadata,
    pub citations: Vec<Citation>,
    pub terms_definitions: Vec<Definition>,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Summary {
    pub total_documents: usize,
    pub failed_documents: usize,
    pub total_citations: usize,
    pub total_terms: usize,
    pub processing_time_ms: u64,
}

impl Summary {
    pub fn add_success(&mut self, result: &DocumentResult) {
        self.total_documents += 1;
        self.total_citations += result.citations.len();
        self.total_terms += result.terms_definitions.len();
        self.processing_time_ms += result.metadata.processing_time_ms;
    }

    pub fn add_failure(&mut self) {
        self.total_documents += 1;
        self.failed_documents += 1;
    }
}

#[derive(Debug, Default)]
pub struct BatchResult {
    pub successful: Vec<DocumentResult>,
    pub failed: Vec<(String, Error)>,
    pub summary: Summary,
}

impl BatchResult {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_success(&mut self, result: DocumentResult) {
        self.summary.add_success(&result);
        self.successful.push(result);
    }

    pub fn add_failure(&mut self, name: String, error: Error) {
        self.summary.add_failure();
        self.failed.push((name, error));
    }

    #[must_use]
    pub fn success_count(&self) -> usize {
        self.successful.len()
    }

    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failed.len()
    }
}

/// Runs the rule pass and the merge for one document at a time. Holds no
/// per-document state, so one engine can serve many threads.
pub struct DocumentEngine {
    config: ExtractionConfig,
    extractor: PatternExtractor,
    reconciler: Reconciler,
}

impl DocumentEngine {
    pub fn new(config: ExtractionConfig) -> Result<Self> {
        Self::with_embedder(config, None)
    }

    /// Like [`new`](Self::new), with an embedding model for similarity. The
    /// model is ignored when `use_embeddings` is off.
    pub fn with_embedder(config: ExtractionConfig, embedder: Option<Box<dyn Embedder>>) -> Result<Self> {
        config.validate()?;
        let embedder = embedder.filter(|_| config.use_embeddings);
        let reconciler = Reconciler::new(SimilarityOracle::new(embedder), &config);
        Ok(Self {
            extractor: PatternExtractor::new(&config)?,
            reconciler,
            config,
        })
    }

    #[must_use]
    pub fn with_reconciler(mut self, reconciler: Reconciler) -> Self {
        self.reconciler = reconciler;
        self
    }

    #[must_use]
    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    #[must_use]
    pub fn extractor(&self) -> &PatternExtractor {
        &self.extractor
    }

    #[must_use]
    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    pub fn process(&self, input: &DocumentInput) -> Result<DocumentResult> {
        let started = Instant::now();
        let pages = prepare_pages(&input.pages)?;
        let canonicalizer = self.extractor.canonicalizer();

        let rule = self.extractor.extract(&pages);
        let ai_citations = input
            .ai_citations
            .iter()
            .cloned()
            .map(|c| c.into_citation(canonicalizer, ExtractionMethod::Ai))
            .collect();
        let ai_definitions = input
            .ai_definitions
            .iter()
            .cloned()
            .map(|d| d.into_definition(ExtractionMethod::Ai))
            .collect();

        let citations = self.reconciler.merge_citations(rule.citations, ai_citations);
        let terms_definitions = self.reconciler.merge_definitions(rule.definitions, ai_definitions);

        let doc_id = if input.name.trim().is_empty() {
            UNNAMED_DOCUMENT.to_string()
        } else {
            canonicalizer.generate_doc_id_from_filename(&input.name)
        };

        let processing_time_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        tracing::info!(
            %doc_id,
            pages = pages.len(),
            citations = citations.len(),
            definitions = terms_definitions.len(),
            processing_time_ms,
            "processed document"
        );

        Ok(DocumentResult {
            doc_id,
            source_filename: input.name.clone(),
            metadata: DocumentMetadata {
                pages: pages.len(),
                processing_date: Utc::now(),
                processing_time_ms,
            },
            citations,
            terms_definitions,
        })
    }

    /// Process every input; a failing document is recorded and the rest
    /// carry on.
    #[must_use]
    pub fn process_batch(&self, inputs: &[DocumentInput]) -> BatchResult {
        let mut result = BatchResult::new();
        for input in inputs {
            match self.process(input) {
                Ok(document) => result.add_success(document),
                Err(e) => {
                    tracing::warn!(name = %input.name, error = %e, "document failed");
                    result.add_failure(input.name.clone(), e);
                }
            }
        }
        result
    }
}

/// Pages sorted by number, rejecting page 0 and repeated numbers.
pub fn prepare_pages(pages: &[Page]) -> Result<Vec<Page>> {
    let mut seen = HashSet::with_capacity(pages.len());
    for page in pages {
        if page.page_number == 0 {
            return Err(Error::InvalidPage(page.page_number));
        }
        if !seen.insert(page.page_number) {
            return Err(Error::DuplicatePage(page.page_number));
        }
    }

    let mut sorted = pages.to_vec();
    sorted.sort_by_key(|p| p.page_number);
    Ok(sorted)
}
