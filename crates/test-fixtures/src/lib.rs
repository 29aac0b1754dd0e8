//! Shared fixtures for integration tests: memory row builders, seeded
//! stores, and the JSON corpora under `data/`.
//!
//! Everything here panics on failure; it is only ever called from tests.

use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use lethe_core::memory::{LifecycleStatus, MemoryMeta, MemoryRow};
use lethe_storage::StorageEngine;

/// Root of the fixture data shipped with this crate.
fn fixtures_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data")
}

/// Load and deserialize a JSON fixture file relative to `data/`.
///
/// # Panics
/// Panics if the file doesn't exist or can't be deserialized.
pub fn load_fixture<T: DeserializeOwned>(relative_path: &str) -> T {
    let path = fixtures_root().join(relative_path);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {}", path.display(), e))
}

pub fn fixture_path(relative_path: &str) -> PathBuf {
    fixtures_root().join(relative_path)
}

// ── Row builder ──

/// Fluent builder for a [`MemoryRow`]. `score` sets both the column and
/// `meta.score`.
#[derive(Debug, Clone)]
pub struct MemoryBuilder {
    row: MemoryRow,
}

impl MemoryBuilder {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            row: MemoryRow {
                summary: format!("summary of {key}"),
                text: format!("text of {key}"),
                key,
                meta: MemoryMeta {
                    score: 50.0,
                    ..Default::default()
                },
                score: 50.0,
            },
        }
    }

    pub fn score(mut self, score: f64) -> Self {
        self.row.score = score;
        self.row.meta.score = score;
        self
    }

    pub fn status(mut self, status: LifecycleStatus) -> Self {
        self.row.meta.status = status;
        self
    }

    pub fn version(mut self, version: u64) -> Self {
        self.row.meta.version = version;
        self
    }

    pub fn access_count(mut self, n: u64) -> Self {
        self.row.meta.access_count = n;
        self
    }

    pub fn links(mut self, in_degree: u64, out_degree: u64) -> Self {
        self.row.meta.in_degree = in_degree;
        self.row.meta.out_degree = out_degree;
        self
    }

    pub fn avg_link_weight(mut self, weight: f64) -> Self {
        self.row.meta.avg_link_weight = Some(weight);
        self
    }

    pub fn last_accessed_at(mut self, at: DateTime<Utc>) -> Self {
        self.row.meta.last_accessed_at = Some(at);
        self
    }

    /// Last accessed `days` days before `now`.
    pub fn idle_days(self, days: i64, now: DateTime<Utc>) -> Self {
        self.last_accessed_at(now - Duration::days(days))
    }

    pub fn extra(mut self, key: &str, value: serde_json::Value) -> Self {
        self.row.meta.extra.insert(key.to_string(), value);
        self
    }

    pub fn build(self) -> MemoryRow {
        self.row
    }
}

/// Zero-padded key so lexical order matches numeric order.
pub fn key(i: usize) -> String {
    format!("mem-{i:05}")
}

/// `count` rows with keys `mem-00000..`, all fresh and active.
pub fn uniform_rows(count: usize, score: f64) -> Vec<MemoryRow> {
    (0..count)
        .map(|i| MemoryBuilder::new(key(i)).score(score).build())
        .collect()
}

// ── Seeded stores ──

/// In-memory store holding `rows`.
pub fn seeded_store(rows: &[MemoryRow]) -> StorageEngine {
    let engine = StorageEngine::open_in_memory().expect("open in-memory store");
    engine.upsert_rows(rows).expect("seed rows");
    engine
}

/// File-backed store holding `rows`. Keep the `TempDir` alive for the
/// duration of the test.
pub fn seeded_file_store(rows: &[MemoryRow]) -> (tempfile::TempDir, StorageEngine) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let engine = StorageEngine::open(&dir.path().join("lethe.db")).expect("open file store");
    engine.upsert_rows(rows).expect("seed rows");
    (dir, engine)
}

// ── Corpus fixtures ──

/// One record of a JSON corpus, with recency given relative to "now".
#[derive(Debug, Clone, Deserialize)]
pub struct CorpusEntry {
    pub key: String,
    pub score: f64,
    #[serde(default)]
    pub idle_days: Option<i64>,
    #[serde(default)]
    pub access_count: u64,
    #[serde(default)]
    pub in_degree: u64,
    #[serde(default)]
    pub out_degree: u64,
    #[serde(default)]
    pub avg_link_weight: Option<f64>,
    #[serde(default)]
    pub status: LifecycleStatus,
    /// Status a decay pass at "now" is expected to assign.
    pub expected_status: LifecycleStatus,
}

impl CorpusEntry {
    pub fn to_row(&self, now: DateTime<Utc>) -> MemoryRow {
        let mut builder = MemoryBuilder::new(&self.key)
            .score(self.score)
            .status(self.status)
            .access_count(self.access_count)
            .links(self.in_degree, self.out_degree);
        if let Some(days) = self.idle_days {
            builder = builder.idle_days(days, now);
        }
        if let Some(w) = self.avg_link_weight {
            builder = builder.avg_link_weight(w);
        }
        builder.build()
    }
}

pub fn load_corpus(relative_path: &str) -> Vec<CorpusEntry> {
    load_fixture(relative_path)
}
