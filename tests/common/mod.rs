//! Shared helpers for integration tests: a deterministic hash-based
//! encoder and an in-memory faculty store.

use std::hash::{DefaultHasher, Hash, Hasher};

use facsearch::{FacultyRow, FacultyStore, SearchResult, TextEncoder, VectorDimension};

/// Dimension used across the integration suites. Small enough to keep
/// tests fast, large enough that distinct terms rarely collide.
pub const TEST_DIMENSION: usize = 64;

/// Deterministic encoder: each lowercase whitespace term bumps one
/// hashed dimension, then the vector is normalized. Texts sharing terms
/// are more similar than unrelated texts, and identical text always
/// yields an identical vector.
pub struct HashEncoder {
    dimension: VectorDimension,
}

impl HashEncoder {
    pub fn new() -> Self {
        Self {
            dimension: VectorDimension::new(TEST_DIMENSION).unwrap(),
        }
    }
}

impl TextEncoder for HashEncoder {
    fn encode(&self, text: &str) -> SearchResult<Vec<f32>> {
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

/// In-memory backing store with a fixed row set.
pub struct MemoryStore(pub Vec<FacultyRow>);

impl FacultyStore for MemoryStore {
    fn fetch_all(&self) -> SearchResult<Vec<FacultyRow>> {
        Ok(self.0.clone())
    }
}

pub fn row(id: u32, text: &str, name: &str, qualification: &str) -> FacultyRow {
    FacultyRow {
        id,
        semantic_text: Some(text.to_string()),
        name: name.to_string(),
        qualification: Some(qualification.to_string()),
    }
}

/// The two-person corpus from the search scenarios.
pub fn sample_rows() -> Vec<FacultyRow> {
    vec![
        row(1, "expert in distributed systems", "Asha Patel", "PhD"),
        row(2, "works on compilers", "Raj Mehta", "PhD"),
    ]
}
