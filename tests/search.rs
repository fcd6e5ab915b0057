//! End-to-end search behavior: loader to engine to ranked hits.

mod common;

use std::sync::Arc;

use common::{HashEncoder, MemoryStore, row, sample_rows};
use facsearch::scoring::{NAME_MATCH_BOOST, cosine_similarity};
use facsearch::{CorpusLoader, SearchEngine, SearchError, SnapshotStore, TextEncoder};
use half::f16;
use tempfile::TempDir;

fn build_engine(rows: Vec<facsearch::FacultyRow>) -> (SearchEngine, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let store = MemoryStore(rows);
    let encoder = HashEncoder::new();
    let snapshot = SnapshotStore::new(temp_dir.path().join("snap"), "AllMiniLML6V2");

    let index = CorpusLoader::new(&store, &encoder, &snapshot, 500)
        .load()
        .unwrap();
    let engine = SearchEngine::new(Arc::new(index), Arc::new(HashEncoder::new()));
    (engine, temp_dir)
}

#[test]
fn exact_name_query_ranks_first_with_name_boost() {
    let (engine, _guard) = build_engine(sample_rows());

    let hits = engine.search("asha patel", 5).unwrap();
    assert_eq!(hits[0].id.get(), 1);

    // Reconstruct the base cosine score and check the +0.5 floor
    let encoder = HashEncoder::new();
    let query: Vec<f16> = encoder
        .encode("asha patel")
        .unwrap()
        .iter()
        .map(|&x| f16::from_f32(x))
        .collect();
    let base = cosine_similarity(&query, engine.index().vector(0));

    assert!(hits[0].score >= base + NAME_MATCH_BOOST - 1e-4);
}

#[test]
fn querying_a_records_exact_text_ranks_it_first() {
    let (engine, _guard) = build_engine(vec![
        row(1, "expert in distributed systems", "Asha Patel", "PhD"),
        row(2, "works on compilers", "Raj Mehta", "PhD"),
        row(3, "studies marine biology", "Lin Chen", "PhD"),
    ]);

    let hits = engine.search("works on compilers", 3).unwrap();
    assert_eq!(hits[0].id.get(), 2);

    // Self-similarity at f16 precision is the maximum base score
    let encoder = HashEncoder::new();
    let query: Vec<f16> = encoder
        .encode("works on compilers")
        .unwrap()
        .iter()
        .map(|&x| f16::from_f32(x))
        .collect();
    let self_sim = cosine_similarity(&query, engine.index().vector(1));
    assert!(self_sim > 0.999);
}

#[test]
fn results_are_sorted_non_increasing_and_capped() {
    let (engine, _guard) = build_engine(vec![
        row(1, "machine learning for vision", "A One", ""),
        row(2, "machine learning theory", "B Two", ""),
        row(3, "medieval history", "C Three", ""),
        row(4, "machine translation systems", "D Four", ""),
        row(5, "organic chemistry", "E Five", ""),
    ]);

    let hits = engine.search("machine learning", 3).unwrap();
    assert_eq!(hits.len(), 3);
    for pair in hits.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[test]
fn limit_larger_than_corpus_returns_everything() {
    let (engine, _guard) = build_engine(sample_rows());

    let hits = engine.search("anything at all", 50).unwrap();
    assert_eq!(hits.len(), 2);
}

#[test]
fn empty_corpus_after_filtering_fails_at_load_not_search() {
    let temp_dir = TempDir::new().unwrap();
    let store = MemoryStore(vec![facsearch::FacultyRow {
        id: 1,
        semantic_text: Some("   ".to_string()),
        name: "Blank".to_string(),
        qualification: None,
    }]);
    let encoder = HashEncoder::new();
    let snapshot = SnapshotStore::new(temp_dir.path().join("snap"), "AllMiniLML6V2");

    let err = CorpusLoader::new(&store, &encoder, &snapshot, 500)
        .load()
        .unwrap_err();
    assert!(matches!(err, SearchError::EmptyCorpus));
}

#[test]
fn whitespace_query_is_rejected() {
    let (engine, _guard) = build_engine(sample_rows());
    assert!(matches!(
        engine.search(" \t ", 5),
        Err(SearchError::EmptyQuery)
    ));
}

#[test]
fn qualification_terms_contribute_to_overlap_boost() {
    let (engine, _guard) = build_engine(vec![
        row(1, "teaches undergraduate courses", "A One", "PhD in robotics"),
        row(2, "teaches undergraduate courses", "B Two", "MSc in painting"),
    ]);

    let hits = engine.search("robotics", 2).unwrap();
    assert_eq!(hits[0].id.get(), 1);
    assert!(hits[0].score > hits[1].score);
}

#[test]
fn case_insensitive_matching() {
    let (engine, _guard) = build_engine(sample_rows());

    let upper = engine.search("ASHA PATEL", 5).unwrap();
    let lower = engine.search("asha patel", 5).unwrap();
    assert_eq!(upper[0].id, lower[0].id);

    // Record fields were lowercased at load, so a mixed-case corpus
    // still matches a lowercase query
    assert_eq!(engine.index().record(0).name, "asha patel");
}
