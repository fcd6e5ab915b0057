//! Hybrid scoring: cosine similarity plus deterministic lexical boosts.
//!
//! Embedding models under-weight exact name and keyword matches, which
//! matter disproportionately when someone searches for a specific
//! person. The fixed additive boosts below counteract that; their
//! magnitudes are part of the engine's behavioral contract and must not
//! drift between deployments.

use half::f16;
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::debug;

use crate::embedding::TextEncoder;
use crate::error::{SearchError, SearchResult};
use crate::index::VectorIndex;
use crate::types::FacultyId;

/// Boost when the full lowercased query is a substring of the name.
pub const NAME_MATCH_BOOST: f32 = 0.5;

/// Boost when the full lowercased query is a substring of the profile text.
pub const TEXT_MATCH_BOOST: f32 = 0.2;

/// Maximum term-overlap boost, scaled by the fraction of query terms
/// found in the text or qualification.
pub const TERM_OVERLAP_BOOST: f32 = 0.1;

/// Substitute denominator for zero-norm vectors, so degenerate rows
/// score ~0 instead of dividing by zero.
pub const NORM_EPSILON: f32 = 1e-8;

/// One ranked search result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchHit {
    pub id: FacultyId,
    pub score: f32,
}

/// Cosine similarity between two half-precision vectors, accumulated in
/// f32.
#[must_use]
pub fn cosine_similarity(a: &[f16], b: &[f16]) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b) {
        let x = x.to_f32();
        let y = y.to_f32();
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denominator = norm_a.sqrt() * norm_b.sqrt();
    let denominator = if denominator == 0.0 {
        NORM_EPSILON
    } else {
        denominator
    };

    dot / denominator
}

/// Query-time engine over an immutable [`VectorIndex`].
pub struct SearchEngine {
    index: Arc<VectorIndex>,
    encoder: Arc<dyn TextEncoder>,
}

impl SearchEngine {
    pub fn new(index: Arc<VectorIndex>, encoder: Arc<dyn TextEncoder>) -> Self {
        Self { index, encoder }
    }

    /// The index this engine scans.
    #[must_use]
    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    /// Runs a hybrid search, returning at most `limit` hits in
    /// descending score order.
    ///
    /// Base score is cosine similarity between the query embedding and
    /// each stored vector (both at f16 precision). On top of that, in
    /// fixed order:
    /// - `+0.5` if the full lowercased query is contained in the name
    /// - `+0.2` if it is contained in the profile text
    /// - `+ (matched_terms / total_terms) * 0.1` for whitespace-split
    ///   query terms individually contained in the text or qualification
    ///
    /// Ties keep index order (stable sort). An empty index yields an
    /// empty list; an empty or whitespace-only query is rejected here
    /// rather than relying on the degenerate "empty string is a
    /// substring of everything" behavior.
    pub fn search(&self, query: &str, limit: usize) -> SearchResult<Vec<SearchHit>> {
        if query.trim().is_empty() {
            return Err(SearchError::EmptyQuery);
        }
        if self.index.is_empty() {
            return Ok(Vec::new());
        }

        let embedding = self.encoder.encode(query)?;
        self.index.dimension().validate_vector(&embedding)?;

        // Down-cast the query to the storage precision so self-similarity
        // is exact
        let query_vector: Vec<f16> = embedding.iter().map(|&x| f16::from_f32(x)).collect();

        let query_lower = query.to_lowercase();
        let terms: Vec<&str> = query_lower.split_whitespace().collect();

        let mut hits = Vec::with_capacity(self.index.len());
        for i in 0..self.index.len() {
            let record = self.index.record(i);
            let mut score = cosine_similarity(&query_vector, self.index.vector(i));

            if record.name.contains(query_lower.as_str()) {
                score += NAME_MATCH_BOOST;
            }
            if record.text.contains(query_lower.as_str()) {
                score += TEXT_MATCH_BOOST;
            }

            let matched = terms
                .iter()
                .filter(|term| record.text.contains(**term) || record.qualification.contains(**term))
                .count();
            if !terms.is_empty() {
                score += (matched as f32 / terms.len() as f32) * TERM_OVERLAP_BOOST;
            }

            hits.push(SearchHit {
                id: record.id,
                score,
            });
        }

        // Stable sort: equal scores keep index order
        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        hits.truncate(limit);

        debug!(query, results = hits.len(), "search complete");
        Ok(hits)
    }
}

impl std::fmt::Debug for SearchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchEngine")
            .field("records", &self.index.len())
            .field("dimension", &self.index.dimension().get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::MockTextEncoder;
    use crate::index::FacultyRecord;
    use crate::types::VectorDimension;

    const DIM: usize = 32;

    fn build_engine(entries: &[(u32, &str, &str, &str)]) -> SearchEngine {
        let encoder = MockTextEncoder::new(DIM);
        let dimension = VectorDimension::new(DIM).unwrap();

        let mut records = Vec::new();
        let mut values = Vec::new();
        for (id, text, name, qual) in entries {
            records.push(FacultyRecord {
                id: FacultyId::new_unchecked(*id),
                text: text.to_lowercase(),
                name: name.to_lowercase(),
                qualification: qual.to_lowercase(),
            });
            let embedding = encoder.encode(text).unwrap();
            values.extend(embedding.iter().map(|&x| f16::from_f32(x)));
        }

        let index = VectorIndex::from_parts(records, values, dimension).unwrap();
        SearchEngine::new(Arc::new(index), Arc::new(MockTextEncoder::new(DIM)))
    }

    #[test]
    fn test_cosine_similarity_basics() {
        let to_f16 = |v: &[f32]| v.iter().map(|&x| f16::from_f32(x)).collect::<Vec<_>>();

        let a = to_f16(&[1.0, 0.0, 0.0]);
        let b = to_f16(&[1.0, 0.0, 0.0]);
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let orthogonal = to_f16(&[0.0, 1.0, 0.0]);
        assert!(cosine_similarity(&a, &orthogonal).abs() < 0.001);

        let opposite = to_f16(&[-1.0, 0.0, 0.0]);
        assert!((cosine_similarity(&a, &opposite) + 1.0).abs() < 0.001);
    }

    #[test]
    fn test_zero_norm_vector_scores_zero() {
        let a: Vec<f16> = vec![f16::from_f32(1.0); 4];
        let zero: Vec<f16> = vec![f16::ZERO; 4];
        let score = cosine_similarity(&a, &zero);
        assert_eq!(score, 0.0);
        assert!(score.is_finite());
    }

    #[test]
    fn test_exact_name_match_gets_name_boost() {
        let engine = build_engine(&[
            (1, "expert in distributed systems", "asha patel", "phd"),
            (2, "works on compilers", "raj mehta", "phd"),
        ]);

        let hits = engine.search("asha patel", 5).unwrap();
        assert_eq!(hits[0].id.get(), 1);

        // Name boost alone guarantees at least base + 0.5; cosine base is
        // >= -1 so anything above -0.5 + 0.2 + 0.1 only happens via the
        // name boost given these disjoint texts
        assert!(hits[0].score >= NAME_MATCH_BOOST - 1.0);
        assert!(hits[0].score > hits[1].score);
    }

    #[test]
    fn test_query_matching_text_outranks_unrelated() {
        let engine = build_engine(&[
            (1, "expert in distributed systems", "asha patel", "phd"),
            (2, "works on compilers", "raj mehta", "phd"),
        ]);

        let hits = engine.search("distributed systems", 5).unwrap();
        assert_eq!(hits[0].id.get(), 1);
    }

    #[test]
    fn test_results_sorted_and_limited() {
        let engine = build_engine(&[
            (1, "machine learning", "a", ""),
            (2, "machine vision", "b", ""),
            (3, "quantum computing", "c", ""),
            (4, "machine translation", "d", ""),
        ]);

        let hits = engine.search("machine", 2).unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits[0].score >= hits[1].score);
    }

    #[test]
    fn test_limit_larger_than_index() {
        let engine = build_engine(&[(1, "alpha", "a", ""), (2, "beta", "b", "")]);
        let hits = engine.search("alpha", 50).unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_empty_query_rejected() {
        let engine = build_engine(&[(1, "alpha", "a", "")]);
        assert!(matches!(
            engine.search("   ", 5),
            Err(SearchError::EmptyQuery)
        ));
        assert!(matches!(engine.search("", 5), Err(SearchError::EmptyQuery)));
    }

    #[test]
    fn test_empty_index_returns_empty() {
        let dimension = VectorDimension::new(DIM).unwrap();
        let index = VectorIndex::from_parts(Vec::new(), Vec::new(), dimension).unwrap();
        let engine = SearchEngine::new(Arc::new(index), Arc::new(MockTextEncoder::new(DIM)));

        let hits = engine.search("anything", 5).unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn test_term_overlap_boost_is_fractional() {
        // Same embedding text so cosine base is equal; only the overlap
        // boost differs
        let engine = build_engine(&[
            (1, "graph algorithms", "a", "phd networks"),
            (2, "graph algorithms", "b", "phd"),
        ]);

        let hits = engine.search("graph networks", 5).unwrap();
        assert_eq!(hits[0].id.get(), 1);
        let expected_gap = 0.5 * TERM_OVERLAP_BOOST;
        assert!((hits[0].score - hits[1].score - expected_gap).abs() < 0.01);
    }

    #[test]
    fn test_self_text_query_ranks_first() {
        let engine = build_engine(&[
            (1, "expert in distributed systems", "asha patel", "phd"),
            (2, "works on compilers and type theory", "raj mehta", "phd"),
            (3, "studies marine biology", "lin chen", "phd"),
        ]);

        let hits = engine.search("works on compilers and type theory", 3).unwrap();
        assert_eq!(hits[0].id.get(), 2);
    }
}
