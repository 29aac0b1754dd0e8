use chrono::Utc;
use lethe_core::memory::LifecycleStatus;
use lethe_core::traits::MemoryStore;
use test_fixtures::{load_corpus, seeded_file_store, MemoryBuilder};

#[test]
fn mixed_corpus_loads_and_seeds() {
    let corpus = load_corpus("memories/mixed_corpus.json");
    assert_eq!(corpus.len(), 7);

    let now = Utc::now();
    let rows: Vec<_> = corpus.iter().map(|e| e.to_row(now)).collect();
    let (_dir, store) = seeded_file_store(&rows);
    assert_eq!(store.count_rows().unwrap(), 7);

    let linked = store.get_row("e-well-linked").unwrap().unwrap();
    assert_eq!(linked.meta.in_degree, 5);
    assert_eq!(linked.meta.avg_link_weight, Some(1.0));
    assert_eq!(linked.meta.status, LifecycleStatus::Cold);
}

#[test]
fn builder_keeps_unknown_meta_keys() {
    let row = MemoryBuilder::new("k")
        .extra("owner", serde_json::json!("agent-7"))
        .build();
    assert_eq!(row.meta.extra["owner"], serde_json::json!("agent-7"));
}
