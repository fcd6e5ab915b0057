//! Error types for the faculty search engine.
//!
//! Structured errors via thiserror with actionable messages. The split
//! follows the failure model of the engine: fatal at construction
//! (model init, empty corpus), recoverable (snapshot problems degrade to
//! regeneration inside the loader and never surface here), and
//! per-query defensive (`EmptyQuery`, `NotReady`).

use thiserror::Error;

/// Main error type for search operations.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error(
        "Failed to initialize embedding model: {0}\nSuggestion: Ensure you have internet connection for first-time model download"
    )]
    ModelInit(String),

    #[error("Failed to generate embedding: {0}")]
    Embedding(String),

    #[error(
        "No usable faculty records found in the backing store\nSuggestion: Load faculty data before building the search index"
    )]
    EmptyCorpus,

    #[error("Query is empty\nSuggestion: Provide at least one non-whitespace search term")]
    EmptyQuery,

    #[error(
        "Embedding dimension mismatch: expected {expected}, got {actual}\nSuggestion: Ensure the snapshot and the query encoder use the same model"
    )]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Search index is not ready yet\nSuggestion: Wait for the index build to complete")]
    NotReady,

    #[error("Storage error: {message}\nSuggestion: {suggestion}")]
    Storage { message: String, suggestion: String },

    #[error("Invalid configuration: {0}")]
    Config(#[from] Box<figment::Error>),
}

impl SearchError {
    /// Stable status code for programmatic error handling.
    pub fn status_code(&self) -> &'static str {
        match self {
            Self::ModelInit(_) => "MODEL_INIT_ERROR",
            Self::Embedding(_) => "EMBEDDING_ERROR",
            Self::EmptyCorpus => "EMPTY_CORPUS",
            Self::EmptyQuery => "EMPTY_QUERY",
            Self::DimensionMismatch { .. } => "DIMENSION_MISMATCH",
            Self::NotReady => "NOT_READY",
            Self::Storage { .. } => "STORAGE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
        }
    }

    /// True for errors that abort startup of the search capability.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ModelInit(_) | Self::EmptyCorpus)
    }
}

/// Result type alias for search operations.
pub type SearchResult<T> = Result<T, SearchError>;
