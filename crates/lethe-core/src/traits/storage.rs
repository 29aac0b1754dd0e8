use crate::errors::LetheResult;
use crate::memory::{MemoryMeta, MemoryRow, MetaPatch};
use crate::models::LockRetryConfig;

/// The narrow storage contract the decay engine consumes.
///
/// Implementations must make `conditional_update` a single indivisible
/// operation: the version check and the write succeed or fail together.
pub trait MemoryStore: Send + Sync {
    /// Snapshot of the current row count.
    fn count_rows(&self) -> LetheResult<u64>;

    /// Rows ordered by key ascending.
    fn select_page(&self, limit: usize, offset: u64) -> LetheResult<Vec<MemoryRow>>;

    fn get_row(&self, key: &str) -> LetheResult<Option<MemoryRow>>;

    /// Write `new_meta` (and `new_score` when given) only if the stored
    /// version equals `expected_version`. Returns rows affected: 0 or 1.
    fn conditional_update(
        &self,
        key: &str,
        new_meta: &MemoryMeta,
        new_score: Option<f64>,
        expected_version: u64,
    ) -> LetheResult<usize>;

    /// Read-modify-write with version-conflict detection and bounded retry.
    /// Returns the new version.
    fn update_with_lock(
        &self,
        key: &str,
        expected_version: u64,
        patch: &MetaPatch,
        score_override: Option<f64>,
        retry: &LockRetryConfig,
    ) -> LetheResult<u64>;
}
