use serde::{Deserialize, Serialize};

use super::MemoryMeta;

/// One stored record as read by a page query.
///
/// `summary` and `text` are opaque payload. `score` mirrors `meta.score`
/// and exists as its own column so it can be indexed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRow {
    pub key: String,
    pub summary: String,
    pub text: String,
    pub meta: MemoryMeta,
    pub score: f64,
}
