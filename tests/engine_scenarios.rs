//! End-to-end scenarios against the search engine.

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use lexica::engine::SearchEngine;
use lexica::index::IndexKind;
use lexica::snapshot::IndexSnapshot;
use lexica::structure::StructureLimits;
use uuid::Uuid;

fn tokenize(content: &str) -> Vec<String> {
    content
        .split_whitespace()
        .map(|token| token.to_lowercase())
        .collect()
}

fn spanish_corpus() -> Vec<(&'static str, Vec<String>)> {
    vec![
        ("d1", tokenize("python es un lenguaje de programación")),
        ("d2", tokenize("java y python son lenguajes populares")),
        ("d3", tokenize("aprende programación en python")),
    ]
}

fn documents(ids: &[&str]) -> HashSet<String> {
    ids.iter().map(|id| id.to_string()).collect()
}

#[test]
fn suffix_index_substring_scenario() {
    let engine = SearchEngine::new();
    engine.build(IndexKind::Suffix, spanish_corpus()).unwrap();

    let hits: HashSet<String> = engine
        .search_documents(IndexKind::Suffix, "python")
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(hits, documents(&["d1", "d2", "d3"]));

    let hits: HashSet<String> = engine
        .search_documents(IndexKind::Suffix, "thon")
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(hits, documents(&["d1", "d2", "d3"]));

    // "leng" occurs in "lenguaje" (d1) and "lenguajes" (d2).
    let hits: HashSet<String> = engine
        .search_documents(IndexKind::Suffix, "leng")
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(hits, documents(&["d1", "d2"]));
}

#[test]
fn patricia_index_prefix_scenario() {
    let engine = SearchEngine::new();
    engine.build(IndexKind::Patricia, spanish_corpus()).unwrap();

    let hits: HashSet<String> = engine
        .search_documents(IndexKind::Patricia, "prog")
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(hits, documents(&["d1", "d3"]));

    let hits = engine.search(IndexKind::Patricia, "prog").unwrap();
    for hit in &hits {
        assert_eq!(hit.matched_words, vec!["programación"]);
    }

    let hits: HashSet<String> = engine
        .search_documents(IndexKind::Patricia, "java")
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(hits, documents(&["d2"]));
}

#[test]
fn relevance_scores_reflect_match_share() {
    let engine = SearchEngine::new();
    engine.build(IndexKind::Suffix, spanish_corpus()).unwrap();

    let hits = engine.search(IndexKind::Suffix, "python").unwrap();
    assert_eq!(hits.len(), 3);

    // d3 has four distinct words, one matching; it must carry 1/4.
    let d3 = hits.iter().find(|h| h.document_id == "d3").unwrap();
    assert!((d3.score - 0.25).abs() < f64::EPSILON);
    assert_eq!(d3.matched_words, vec!["python"]);

    // Hits are ordered best score first.
    for pair in hits.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[test]
fn removal_scenario() {
    let engine = SearchEngine::new();
    engine.build(IndexKind::Suffix, spanish_corpus()).unwrap();

    assert!(engine.remove_word(IndexKind::Suffix, "python").unwrap());
    assert!(engine
        .search_documents(IndexKind::Suffix, "python")
        .unwrap()
        .is_empty());
    assert!(engine
        .search_documents(IndexKind::Suffix, "thon")
        .unwrap()
        .is_empty());

    // Other words survive the rebuild.
    assert_eq!(
        engine.search_documents(IndexKind::Suffix, "leng").unwrap().len(),
        2
    );
}

#[test]
fn snapshot_round_trip_scenario() {
    let engine = SearchEngine::new();
    engine.build(IndexKind::Patricia, spanish_corpus()).unwrap();

    let json = engine.snapshot(IndexKind::Patricia).unwrap().to_json().unwrap();
    let snapshot = IndexSnapshot::from_json(&json).unwrap();

    let restored = SearchEngine::new();
    restored.restore(&snapshot).unwrap();

    for query in ["prog", "python", "java", "leng", "aprende"] {
        assert_eq!(
            restored.search_documents(IndexKind::Patricia, query).unwrap(),
            engine.search_documents(IndexKind::Patricia, query).unwrap(),
            "query {query:?} diverged after round trip"
        );
    }
}

#[test]
fn structure_export_scales_and_bounds_explicitly() {
    let engine = SearchEngine::new();
    let corpus: Vec<(String, Vec<String>)> = (0..200)
        .map(|i| {
            (
                Uuid::new_v4().to_string(),
                vec![format!("palabra{i}"), format!("termino{i}")],
            )
        })
        .collect();
    engine.build(IndexKind::Patricia, corpus).unwrap();

    let full = engine.to_structure_tree(IndexKind::Patricia).unwrap();
    // Full export: every stored word appears as a terminal.
    fn terminal_count(node: &lexica::structure::StructureNode) -> usize {
        let own = usize::from(
            node.metadata
                .as_ref()
                .is_some_and(|meta| meta.contains_key("word")),
        );
        own + node.children.iter().map(terminal_count).sum::<usize>()
    }
    assert_eq!(terminal_count(&full), 400);

    let bounded = engine
        .to_structure_tree_bounded(
            IndexKind::Patricia,
            &StructureLimits {
                max_depth: 2,
                max_children: 10,
            },
        )
        .unwrap();
    assert!(bounded.node_count() < full.node_count());
    let json = serde_json::to_value(&bounded).unwrap();
    assert!(json.to_string().contains("\"truncated\":true"));
}

#[test]
fn bidirectional_consistency_under_concurrent_reads_and_rebuilds() {
    let engine = Arc::new(SearchEngine::new());
    engine.build(IndexKind::Suffix, spanish_corpus()).unwrap();

    let mut readers = Vec::new();
    for _ in 0..4 {
        let engine = Arc::clone(&engine);
        readers.push(thread::spawn(move || {
            for _ in 0..200 {
                // Readers always see a fully built index: either the old
                // or the new corpus, never a torn state.
                let hits = engine.search_documents(IndexKind::Suffix, "python").unwrap();
                assert!(hits.len() == 3 || hits.is_empty());
            }
        }));
    }

    for round in 0..20 {
        if round % 2 == 0 {
            engine
                .build(IndexKind::Suffix, vec![("solo", vec!["rust"])])
                .unwrap();
        } else {
            engine.build(IndexKind::Suffix, spanish_corpus()).unwrap();
        }
    }

    for reader in readers {
        reader.join().unwrap();
    }
}
