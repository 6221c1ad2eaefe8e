use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use legalex_core::{DocumentEngine, DocumentResult, ExtractionConfig, ReviewItem, ReviewQueue, ReviewSummary, Summary};
use serde::Serialize;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::cli::ExtractArgs;
use crate::input::{collect_paths, load_document};

#[derive(Debug, Serialize)]
pub struct Report {
    pub documents: Vec<DocumentResult>,
    pub summary: ReportSummary,
    pub review: Vec<ReviewItem>,
    pub errors: Vec<DocumentError>,
}

#[derive(Debug, Default, Serialize)]
pub struct ReportSummary {
    #[serde(flatten)]
    pub totals: Summary,
    pub review: ReviewSummary,
}

#[derive(Debug, Serialize)]
pub struct DocumentError {
    pub path: String,
    pub error: String,
}

pub async fn run(args: ExtractArgs) -> Result<()> {
    let config = resolve_config(&args)?;
    let paths = collect_paths(&args.paths)?;
    let engine = Arc::new(DocumentEngine::new(config.clone())?);

    let outcomes = process_all(engine, paths, usize::from(args.jobs)).await;
    let report = build_report(outcomes, config.review_threshold);
    info!(
        documents = report.summary.totals.total_documents,
        failed = report.summary.totals.failed_documents,
        review = report.summary.review.total,
        "extraction finished"
    );

    let json = serde_json::to_string_pretty(&report)?;
    match &args.output {
        Some(path) => std::fs::write(path, json + "\n").with_context(|| format!("writing {}", path.display()))?,
        None => println!("{json}"),
    }
    Ok(())
}

fn resolve_config(args: &ExtractArgs) -> Result<ExtractionConfig> {
    let mut config = ExtractionConfig::load(args.config.as_deref())?;
    if let Some(threshold) = args.review_threshold {
        config.review_threshold = threshold;
    }
    if args.no_embeddings {
        config.use_embeddings = false;
    }
    config.validate()?;
    Ok(config)
}

/// Run every document on the blocking pool, at most `jobs` at once.
/// Outcomes come back in input order.
async fn process_all(
    engine: Arc<DocumentEngine>,
    paths: Vec<PathBuf>,
    jobs: usize,
) -> Vec<(PathBuf, Result<DocumentResult>)> {
    let semaphore = Arc::new(Semaphore::new(jobs.max(1)));

    let handles: Vec<_> = paths
        .into_iter()
        .map(|path| {
            let engine = Arc::clone(&engine);
            let semaphore = Arc::clone(&semaphore);
            let worker_path = path.clone();
            let handle = tokio::spawn(run_one(engine, semaphore, worker_path));
            (path, handle)
        })
        .collect();

    let mut outcomes = Vec::with_capacity(handles.len());
    for (path, handle) in handles {
        let outcome = match handle.await {
            Ok(result) => result,
            Err(e) => Err(anyhow!("worker failed: {e}")),
        };
        outcomes.push((path, outcome));
    }
    outcomes
}

async fn run_one(engine: Arc<DocumentEngine>, semaphore: Arc<Semaphore>, path: PathBuf) -> Result<DocumentResult> {
    let _permit = semaphore.acquire_owned().await?;
    tokio::task::spawn_blocking(move || process_one(&engine, &path))
        .await
        .map_err(|e| anyhow!("worker failed: {e}"))?
}

fn process_one(engine: &DocumentEngine, path: &Path) -> Result<DocumentResult> {
    let input = load_document(path)?;
    let result = engine
        .process(&input)
        .with_context(|| format!("processing {}", path.display()))?;
    Ok(result)
}

fn build_report(outcomes: Vec<(PathBuf, Result<DocumentResult>)>, review_threshold: f64) -> Report {
    let mut summary = ReportSummary::default();
    let mut queue = ReviewQueue::new(review_threshold);
    let mut documents = Vec::new();
    let mut errors = Vec::new();

    for (path, outcome) in outcomes {
        match outcome {
            Ok(document) => {
                summary.totals.add_success(&document);
                queue.check(&document.doc_id, &document.citations, &document.terms_definitions);
                documents.push(document);
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "document failed");
                summary.totals.add_failure();
                errors.push(DocumentError {
                    path: path.display().to_string(),
                    error: format!("{e:#}"),
                });
            }
        }
    }

    summary.review = queue.summary();
    Report {
        documents,
        summary,
        review: queue.into_items(),
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use legalex_core::{DocumentInput, ExtractionMethod, Page, RawDefinition};

    fn engine() -> DocumentEngine {
        DocumentEngine::new(ExtractionConfig::default()).unwrap()
    }

    #[test]
    fn report_keeps_order_and_collects_failures() {
        let engine = engine();
        let low = DocumentInput::new("low.pdf", vec![Page::new(1, "")]).with_ai_definitions(vec![RawDefinition {
            term: "Tax".into(),
            definition: "A levy on supplies.".into(),
            page: 1,
            confidence: 0.4,
        }]);
        let outcomes = vec![
            (PathBuf::from("low.json"), engine.process(&low).map_err(Into::into)),
            (PathBuf::from("broken.json"), Err(anyhow!("parsing broken.json"))),
            (
                PathBuf::from("empty.json"),
                engine.process(&DocumentInput::new("empty.pdf", vec![])).map_err(Into::into),
            ),
        ];

        let report = build_report(outcomes, 0.7);
        let ids: Vec<_> = report.documents.iter().map(|d| d.doc_id.as_str()).collect();
        assert_eq!(ids, vec!["low", "empty"]);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].path, "broken.json");
        assert_eq!(report.summary.totals.total_documents, 3);
        assert_eq!(report.summary.totals.failed_documents, 1);
        assert_eq!(report.review.len(), 1);
        assert_eq!(report.review[0].extraction_method, ExtractionMethod::Ai);
        assert_eq!(report.summary.review.definitions, 1);
    }

    #[tokio::test]
    async fn missing_file_becomes_document_error() {
        let outcomes = process_all(Arc::new(engine()), vec![PathBuf::from("/nonexistent/doc.json")], 2).await;
        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].1.is_err());
    }
}
