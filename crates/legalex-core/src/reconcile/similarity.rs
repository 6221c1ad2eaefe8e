use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimilarityError {
    #[error("Similarity backend unavailable: {0}")]
    Unavailable(String),
    #[error("Embedding failed: {0}")]
    Embedding(String),
    #[error("Embedding has zero magnitude")]
    DegenerateVector,
}

pub type SimilarityResult<T> = Result<T, SimilarityError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityMethod {
    Embedding,
    Fuzzy,
    Exact,
}

impl std::fmt::Display for SimilarityMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Embedding => "embedding",
            Self::Fuzzy => "fuzzy",
            Self::Exact => "exact",
        })
    }
}

/// One way of scoring how alike two strings are, in `[0, 1]`.
pub trait SimilarityBackend: Send + Sync {
    fn method(&self) -> SimilarityMethod;

    fn is_available(&self) -> bool {
        true
    }

    fn similarity(&self, a: &str, b: &str) -> SimilarityResult<f64>;
}

/// Sentence-embedding model. Inference lives outside this crate; callers
/// plug a model in through this trait.
pub trait Embedder: Send + Sync {
    fn embed(&self, text: &str) -> SimilarityResult<Vec<f32>>;

    fn is_available(&self) -> bool;
}

pub struct EmbeddingSimilarity {
    embedder: Box<dyn Embedder>,
}

impl EmbeddingSimilarity {
    #[must_use]
    pub fn new(embedder: Box<dyn Embedder>) -> Self {
        Self { embedder }
    }
}

impl SimilarityBackend for EmbeddingSimilarity {
    fn method(&self) -> SimilarityMethod {
        SimilarityMethod::Embedding
    }

    fn is_available(&self) -> bool {
        self.embedder.is_available()
    }

    /// Cosine similarity rescaled from `[-1, 1]` to `[0, 1]`.
    fn similarity(&self, a: &str, b: &str) -> SimilarityResult<f64> {
        let va = self.embedder.embed(a)?;
        let vb = self.embedder.embed(b)?;
        if va.len() != vb.len() {
            return Err(SimilarityError::Embedding(format!(
                "dimension mismatch: {} vs {}",
                va.len(),
                vb.len()
            )));
        }

        let (mut dot, mut norm_a, mut norm_b) = (0.0_f64, 0.0_f64, 0.0_f64);
        for (x, y) in va.iter().zip(&vb) {
            let (x, y) = (f64::from(*x), f64::from(*y));
            dot += x * y;
            norm_a += x * x;
            norm_b += y * y;
        }
        if norm_a == 0.0 || norm_b == 0.0 {
            return Err(SimilarityError::DegenerateVector);
        }

        let cosine = dot / (norm_a.sqrt() * norm_b.sqrt());
        Ok(((cosine + 1.0) / 2.0).clamp(0.0, 1.0))
    }
}

/// Normalized Levenshtein ratio over lowercased text.
#[derive(Debug, Clone, Copy, Default)]
pub struct FuzzySimilarity;

impl SimilarityBackend for FuzzySimilarity {
    fn method(&self) -> SimilarityMethod {
        SimilarityMethod::Fuzzy
    }

    fn similarity(&self, a: &str, b: &str) -> SimilarityResult<f64> {
        Ok(strsim::normalized_levenshtein(&a.to_lowercase(), &b.to_lowercase()))
    }
}

/// Case-insensitive equality: 1.0 or 0.0.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactSimilarity;

impl SimilarityBackend for ExactSimilarity {
    fn method(&self) -> SimilarityMethod {
        SimilarityMethod::Exact
    }

    fn similarity(&self, a: &str, b: &str) -> SimilarityResult<f64> {
        Ok(exact(a, b))
    }
}

fn exact(a: &str, b: &str) -> f64 {
    if a.to_lowercase() == b.to_lowercase() {
        1.0
    } else {
        0.0
    }
}

/// Similarity strategy chosen once, at construction, from the backends that
/// report themselves available. A backend that errors on a call degrades that
/// call to the next backend in the chain.
pub struct SimilarityOracle {
    chain: Vec<Box<dyn SimilarityBackend>>,
}

impl SimilarityOracle {
    /// Embedding (when given and available), then fuzzy, then exact.
    #[must_use]
    pub fn new(embedder: Option<Box<dyn Embedder>>) -> Self {
        let mut chain: Vec<Box<dyn SimilarityBackend>> = Vec::new();
        if let Some(embedder) = embedder {
            chain.push(Box::new(EmbeddingSimilarity::new(embedder)));
        }
        chain.push(Box::new(FuzzySimilarity));
        Self::with_backends(chain)
    }

    /// Use the given backends in order, dropping any that are unavailable.
    /// Exact matching is always the last resort.
    #[must_use]
    pub fn with_backends(backends: Vec<Box<dyn SimilarityBackend>>) -> Self {
        let mut chain: Vec<Box<dyn SimilarityBackend>> = backends
            .into_iter()
            .filter(|backend| {
                let available = backend.is_available();
                if !available {
                    tracing::warn!(method = %backend.method(), "similarity backend unavailable, skipping");
                }
                available
            })
            .collect();
        if !chain.iter().any(|b| b.method() == SimilarityMethod::Exact) {
            chain.push(Box::new(ExactSimilarity));
        }
        tracing::debug!(method = %chain[0].method(), "similarity oracle ready");
        Self { chain }
    }

    #[must_use]
    pub fn exact() -> Self {
        Self::with_backends(Vec::new())
    }

    /// The method answering calls while nothing fails.
    #[must_use]
    pub fn method(&self) -> SimilarityMethod {
        self.chain.first().map_or(SimilarityMethod::Exact, |b| b.method())
    }

    #[must_use]
    pub fn similarity(&self, a: &str, b: &str) -> f64 {
        for backend in &self.chain {
            match backend.similarity(a, b) {
                Ok(score) if score.is_nan() => {
                    tracing::warn!(method = %backend.method(), "similarity backend returned NaN, falling back");
                }
                Ok(score) => return score.clamp(0.0, 1.0),
                Err(error) => {
                    tracing::warn!(method = %backend.method(), %error, "similarity backend failed, falling back");
                }
            }
        }
        exact(a, b)
    }
}

impl Default for SimilarityOracle {
    fn default() -> Self {
        Self::new(None)
    }
}
