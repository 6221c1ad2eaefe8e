pub mod canonical;
pub mod config;
pub mod error;
pub mod extract;
pub mod models;
pub mod pipeline;
pub mod reconcile;
pub mod review;
pub mod validate;

pub use canonical::{is_specific_id, Canonicalizer};
pub use config::ExtractionConfig;
pub use error::{Error, Result};
pub use extract::{ExtractionOutput, PatternExtractor};
pub use models::{Citation, Definition, ExtractionMethod, Page, RawCitation, RawDefinition};
pub use pipeline::{BatchResult, DocumentEngine, DocumentInput, DocumentMetadata, DocumentResult, Summary};
pub use reconcile::{
    Embedder, Preference, Reconciler, SimilarityBackend, SimilarityError, SimilarityMethod, SimilarityOracle,
};
pub use review::{EntityKind, ReviewItem, ReviewQueue, ReviewStatus, ReviewSummary};
pub use validate::{rules::Rejection, StructuralValidator};
