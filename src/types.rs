//! Type-safe wrappers for faculty search.
//!
//! Newtypes prevent mixing up raw integers and give the snapshot format
//! a stable, validated identifier type.

use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;

use crate::error::SearchError;

/// Embedding dimension of the default all-MiniLM-L6-v2 model.
pub const EMBEDDING_DIMENSION_384: usize = 384;

/// Type-safe wrapper for faculty record IDs.
///
/// IDs are assigned externally by the backing store (SQLite rowids in
/// practice) and are always non-zero, so `NonZeroU32` gives us a free
/// niche and rules out an uninitialized-id state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FacultyId(NonZeroU32);

impl FacultyId {
    /// Creates a new `FacultyId`. Returns `None` if the id is zero.
    #[must_use]
    pub fn new(id: u32) -> Option<Self> {
        NonZeroU32::new(id).map(Self)
    }

    /// Creates a new `FacultyId`, panicking on zero.
    ///
    /// # Panics
    /// Panics if `id` is zero. Use `new()` for fallible construction.
    #[must_use]
    pub fn new_unchecked(id: u32) -> Self {
        Self(NonZeroU32::new(id).expect("FacultyId cannot be zero"))
    }

    /// Returns the underlying u32 value.
    #[must_use]
    pub fn get(&self) -> u32 {
        self.0.get()
    }
}

impl std::fmt::Display for FacultyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Type-safe wrapper for embedding dimensions.
///
/// Validated once at construction so downstream code can rely on a
/// non-zero dimension when slicing the columnar vector store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VectorDimension(usize);

impl VectorDimension {
    /// Creates a new `VectorDimension`, rejecting zero.
    pub fn new(dim: usize) -> Result<Self, SearchError> {
        if dim == 0 {
            return Err(SearchError::Storage {
                message: "vector dimension cannot be zero".to_string(),
                suggestion: "Use the dimension reported by the embedding model".to_string(),
            });
        }
        Ok(Self(dim))
    }

    /// The standard 384-dimensional embedding of all-MiniLM-L6-v2.
    #[must_use]
    pub const fn dimension_384() -> Self {
        Self(EMBEDDING_DIMENSION_384)
    }

    /// Returns the underlying dimension value.
    #[must_use]
    pub const fn get(&self) -> usize {
        self.0
    }

    /// Validates that a vector has the expected dimension.
    pub fn validate_vector(&self, vector: &[f32]) -> Result<(), SearchError> {
        if vector.len() != self.0 {
            return Err(SearchError::DimensionMismatch {
                expected: self.0,
                actual: vector.len(),
            });
        }
        Ok(())
    }
}
