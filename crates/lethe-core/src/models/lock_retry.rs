use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::defaults;

/// Retry policy for optimistic-lock updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockRetryConfig {
    /// Additional attempts after the first conflict.
    pub max_conflict_retries: u32,
    /// Pause between attempts. Zero retries immediately.
    pub retry_delay_ms: u64,
    /// On conflict, adopt the observed version as the new expectation.
    /// When false, every retry keeps the caller's original version.
    pub resync_version: bool,
}

impl Default for LockRetryConfig {
    fn default() -> Self {
        Self {
            max_conflict_retries: defaults::DEFAULT_MAX_CONFLICT_RETRIES,
            retry_delay_ms: 0,
            resync_version: false,
        }
    }
}

impl LockRetryConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}
