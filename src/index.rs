//! In-memory columnar vector index.
//!
//! Stores one [`FacultyRecord`] per surviving faculty entry plus a single
//! flat array of half-precision embedding values, position-aligned with
//! the records. Half precision (f16) halves resident memory compared to
//! f32 with negligible accuracy loss for MiniLM-class embeddings.
//!
//! The index is intentionally dumb: no search logic lives here. It is
//! built once, never mutated, and a refreshed corpus means building a
//! whole new index.

use half::f16;
use serde::{Deserialize, Serialize};

use crate::error::{SearchError, SearchResult};
use crate::types::{FacultyId, VectorDimension};

/// One faculty entry as stored in the index.
///
/// Text fields are lowercased once at load time so query-time substring
/// boosts never re-normalize. `text` is the truncated profile text the
/// embedding was generated from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacultyRecord {
    pub id: FacultyId,
    pub text: String,
    pub name: String,
    pub qualification: String,
}

/// Position-addressed columnar store of records and their embeddings.
///
/// Invariant: `records.len() * dimension == values.len()`, and position
/// `i` in both columns refers to the same faculty entry.
#[derive(Debug, Clone)]
pub struct VectorIndex {
    records: Vec<FacultyRecord>,
    values: Vec<f16>,
    dimension: VectorDimension,
}

impl VectorIndex {
    /// Assembles an index from its two columns, checking the alignment
    /// invariant.
    pub fn from_parts(
        records: Vec<FacultyRecord>,
        values: Vec<f16>,
        dimension: VectorDimension,
    ) -> SearchResult<Self> {
        if records.len() * dimension.get() != values.len() {
            return Err(SearchError::Storage {
                message: format!(
                    "index misaligned: {} records x {} dims != {} values",
                    records.len(),
                    dimension.get(),
                    values.len()
                ),
                suggestion: "Rebuild the index from the backing store".to_string(),
            });
        }
        Ok(Self {
            records,
            values,
            dimension,
        })
    }

    /// Number of indexed records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Embedding dimension shared by all stored vectors.
    #[must_use]
    pub fn dimension(&self) -> VectorDimension {
        self.dimension
    }

    /// Record at position `i`.
    ///
    /// # Panics
    /// Panics if `i >= len()`.
    #[must_use]
    pub fn record(&self, i: usize) -> &FacultyRecord {
        &self.records[i]
    }

    /// Embedding vector at position `i`.
    ///
    /// # Panics
    /// Panics if `i >= len()`.
    #[must_use]
    pub fn vector(&self, i: usize) -> &[f16] {
        let dim = self.dimension.get();
        &self.values[i * dim..(i + 1) * dim]
    }

    /// Ids in index order.
    pub fn ids(&self) -> impl Iterator<Item = FacultyId> + '_ {
        self.records.iter().map(|r| r.id)
    }

    /// All records in index order.
    #[must_use]
    pub fn records(&self) -> &[FacultyRecord] {
        &self.records
    }

    /// The raw half-precision value column.
    #[must_use]
    pub fn values(&self) -> &[f16] {
        &self.values
    }
}
