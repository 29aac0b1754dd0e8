use lethe_core::memory::{MemoryMeta, MemoryRow};
use lethe_core::traits::CancellationToken;
use lethe_storage::{with_fn, BatchOptions, StorageEngine};
use proptest::prelude::*;

fn seeded(count: usize) -> StorageEngine {
    let storage = StorageEngine::open_in_memory().unwrap();
    let rows: Vec<_> = (0..count)
        .map(|i| MemoryRow {
            key: format!("p-{i:05}"),
            summary: String::new(),
            text: String::new(),
            meta: MemoryMeta::default(),
            score: 0.0,
        })
        .collect();
    storage.upsert_rows(&rows).unwrap();
    storage
}

// ── Every row visited exactly once, ceil(K/B) pages ──────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn pages_partition_rows(rows in 0usize..60, batch_size in 1usize..17) {
        let storage = seeded(rows);
        let opts = BatchOptions { batch_size, ..Default::default() };
        let mut visited = Vec::new();
        let stats = storage
            .process_in_batches(
                &opts,
                None,
                &CancellationToken::new(),
                &mut with_fn(|_, row| {
                    visited.push(row.key.clone());
                    Ok(())
                }),
            )
            .unwrap();

        prop_assert_eq!(stats.processed_batches as usize, rows.div_ceil(batch_size));
        prop_assert_eq!(visited.len(), rows);
        let mut sorted = visited.clone();
        sorted.sort();
        sorted.dedup();
        prop_assert_eq!(sorted, visited);
    }
}

// ── A single failing row costs exactly one page ──────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn one_bad_row_one_failed_page(rows in 1usize..40, batch_size in 1usize..9, pick in 0usize..40) {
        let bad = pick % rows;
        let bad_key = format!("p-{bad:05}");
        let storage = seeded(rows);
        let opts = BatchOptions {
            batch_size,
            max_retries: 0,
            ..Default::default()
        };
        let stats = storage
            .process_in_batches(
                &opts,
                None,
                &CancellationToken::new(),
                &mut with_fn(|_, row| {
                    if row.key == bad_key {
                        Err(lethe_storage::to_storage_err("bad row"))
                    } else {
                        Ok(())
                    }
                }),
            )
            .unwrap();

        let page_rows = batch_size.min(rows - (bad / batch_size) * batch_size);
        prop_assert_eq!(stats.failed_batches, 1);
        prop_assert_eq!(stats.processed_memories as usize, rows - page_rows);
        prop_assert_eq!(stats.checkpoint.next_offset as usize, rows);
    }
}
