use serde::{Deserialize, Serialize};

use super::Checkpoint;

/// Outcome of one `process_in_batches` run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchStats {
    /// Row count snapshotted when the run started.
    pub total_memories: u64,
    /// Rows in committed pages during this run.
    pub processed_memories: u64,
    /// Pages committed during this run.
    pub processed_batches: u64,
    /// Pages abandoned after exhausting retries.
    pub failed_batches: u64,
    /// Page retries across the run.
    pub retry_count: u64,
    pub interrupted: bool,
    pub last_error: Option<String>,
    pub checkpoint: Checkpoint,
    pub duration_ms: u64,
}

impl BatchStats {
    /// True when every page committed and the run was not interrupted.
    pub fn is_clean(&self) -> bool {
        self.failed_batches == 0 && !self.interrupted
    }
}
