//! Embedding generation for faculty profile search.
//!
//! Wraps fastembed behind the [`TextEncoder`] trait so the loader and the
//! scorer never depend on a concrete model. The default model is
//! AllMiniLML6V2 (384 dimensions), loaded once at construction; a failed
//! initialization is fatal because nothing downstream can run without it.

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::sync::Mutex;

use crate::config::Settings;
use crate::error::{SearchError, SearchResult};
use crate::types::{EMBEDDING_DIMENSION_384, VectorDimension};

/// Trait for turning text into fixed-dimension embedding vectors.
///
/// Implementations must be deterministic for a fixed model version:
/// the same text always yields the same vector.
pub trait TextEncoder: Send + Sync {
    /// Encode a single text into an embedding vector.
    fn encode(&self, text: &str) -> SearchResult<Vec<f32>>;

    /// Encode multiple texts in one call.
    ///
    /// The default implementation encodes one at a time; model-backed
    /// implementations may batch internally.
    fn encode_batch(&self, texts: &[&str]) -> SearchResult<Vec<Vec<f32>>> {
        texts.iter().map(|text| self.encode(text)).collect()
    }

    /// Dimension of the vectors this encoder produces.
    fn dimension(&self) -> VectorDimension;
}

/// FastEmbed implementation using the AllMiniLML6V2 model.
pub struct FastEmbedEncoder {
    model: Mutex<TextEmbedding>,
    dimension: VectorDimension,
}

impl FastEmbedEncoder {
    /// Create a new encoder, downloading the model on first use.
    ///
    /// # Errors
    /// Returns `SearchError::ModelInit` if the model fails to initialize
    /// or the configured model name is not supported.
    pub fn new(settings: &Settings) -> SearchResult<Self> {
        let model = match settings.model.name.as_str() {
            "AllMiniLML6V2" => EmbeddingModel::AllMiniLML6V2,
            other => {
                return Err(SearchError::ModelInit(format!(
                    "unsupported embedding model '{other}', only AllMiniLML6V2 is supported"
                )));
            }
        };

        let model = TextEmbedding::try_new(
            InitOptions::new(model)
                .with_cache_dir(settings.models_dir())
                .with_show_download_progress(settings.debug),
        )
        .map_err(|e| SearchError::ModelInit(e.to_string()))?;

        Ok(Self {
            model: Mutex::new(model),
            dimension: VectorDimension::dimension_384(),
        })
    }
}

impl TextEncoder for FastEmbedEncoder {
    fn encode(&self, text: &str) -> SearchResult<Vec<f32>> {
        let mut vectors = self.encode_batch(&[text])?;
        vectors
            .pop()
            .ok_or_else(|| SearchError::Embedding("model returned no embedding".to_string()))
    }

    fn encode_batch(&self, texts: &[&str]) -> SearchResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        // fastembed expects owned strings
        let owned: Vec<String> = texts.iter().map(|&s| s.to_string()).collect();

        let embeddings = self
            .model
            .lock()
            .map_err(|_| {
                SearchError::Embedding(
                    "failed to acquire model lock, model may be poisoned".to_string(),
                )
            })?
            .embed(owned, None)
            .map_err(|e| SearchError::Embedding(e.to_string()))?;

        for embedding in &embeddings {
            if embedding.len() != EMBEDDING_DIMENSION_384 {
                return Err(SearchError::DimensionMismatch {
                    expected: EMBEDDING_DIMENSION_384,
                    actual: embedding.len(),
                });
            }
        }

        Ok(embeddings)
    }

    fn dimension(&self) -> VectorDimension {
        self.dimension
    }
}

impl std::fmt::Debug for FastEmbedEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FastEmbedEncoder")
            .field("model", &"<TextEmbedding>")
            .field("dimension", &self.dimension)
            .finish()
    }
}

/// Mock encoder for unit tests.
///
/// Produces deterministic unit-length vectors from term hashes, so texts
/// sharing terms are more similar than unrelated texts.
#[cfg(test)]
pub struct MockTextEncoder {
    dimension: VectorDimension,
}

#[cfg(test)]
impl MockTextEncoder {
    pub fn new(dim: usize) -> Self {
        Self {
            dimension: VectorDimension::new(dim).expect("test dimension must be non-zero"),
        }
    }
}

#[cfg(test)]
impl TextEncoder for MockTextEncoder {
    fn encode(&self, text: &str) -> SearchResult<Vec<f32>> {
        use std::hash::{DefaultHasher, Hash, Hasher};

        let dim = self.dimension.get();
        let mut vector = vec![0.0f32; dim];

        for term in text.to_lowercase().split_whitespace() {
            let mut hasher = DefaultHasher::new();
            term.hash(&mut hasher);
            vector[(hasher.finish() as usize) % dim] += 1.0;
        }

        let magnitude: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for value in &mut vector {
                *value /= magnitude;
            }
        }

        Ok(vector)
    }

    fn dimension(&self) -> VectorDimension {
        self.dimension
    }
}
