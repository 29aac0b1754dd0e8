//! Optimistic-lock contention.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LockMetrics {
    pub updates: u64,
    pub conflicts: u64,
}

impl LockMetrics {
    pub fn record(&mut self, conflict: bool) {
        self.updates += 1;
        if conflict {
            self.conflicts += 1;
        }
    }

    /// Conflicts per attempted update, 0.0 when nothing was attempted.
    pub fn conflict_rate(&self) -> f64 {
        if self.updates == 0 {
            0.0
        } else {
            self.conflicts as f64 / self.updates as f64
        }
    }
}
