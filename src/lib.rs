//! Hybrid semantic search over faculty profiles.
//!
//! The pipeline: a [`loader::CorpusLoader`] pulls rows from a
//! [`store::FacultyStore`], encodes them through an
//! [`embedding::TextEncoder`] into a half-precision
//! [`index::VectorIndex`] (or restores one from a
//! [`snapshot::SnapshotStore`]), and a [`scoring::SearchEngine`] answers
//! queries with cosine similarity plus lexical boosts. Services hold the
//! engine behind an [`engine::SearchHandle`] so queries before the index
//! is built get an explicit not-ready signal.

pub mod config;
pub mod embedding;
pub mod engine;
pub mod error;
pub mod index;
pub mod loader;
pub mod scoring;
pub mod snapshot;
pub mod store;
pub mod types;

// Explicit exports for better API clarity
pub use config::Settings;
pub use embedding::{FastEmbedEncoder, TextEncoder};
pub use engine::SearchHandle;
pub use error::{SearchError, SearchResult};
pub use index::{FacultyRecord, VectorIndex};
pub use loader::CorpusLoader;
pub use scoring::{SearchEngine, SearchHit};
pub use snapshot::SnapshotStore;
pub use store::{FacultyRow, FacultyStore, JsonFacultyStore};
pub use types::{EMBEDDING_DIMENSION_384, FacultyId, VectorDimension};
