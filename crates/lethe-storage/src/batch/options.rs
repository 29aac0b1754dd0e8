use std::time::Duration;

use lethe_core::config::{defaults, AlgorithmConfig};

/// Knobs for one `process_in_batches` run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    pub batch_size: usize,
    /// Retries per page after the first failed attempt.
    pub max_retries: u32,
    /// Backoff before the first retry; doubles per retry.
    pub retry_backoff_ms: u64,
    pub max_backoff_ms: u64,
    /// Deadline for one page transaction.
    pub transaction_timeout_ms: u64,
    /// Pause between committed pages.
    pub inter_batch_delay_ms: u64,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            batch_size: defaults::DEFAULT_BATCH_SIZE,
            max_retries: defaults::DEFAULT_BATCH_MAX_RETRIES,
            retry_backoff_ms: defaults::DEFAULT_RETRY_BACKOFF_MS,
            max_backoff_ms: defaults::DEFAULT_MAX_BACKOFF_MS,
            transaction_timeout_ms: defaults::DEFAULT_TRANSACTION_TIMEOUT_MS,
            inter_batch_delay_ms: defaults::DEFAULT_INTER_BATCH_DELAY_MS,
        }
    }
}

impl BatchOptions {
    pub fn from_config(config: &AlgorithmConfig) -> Self {
        Self {
            batch_size: config.scheduler.batch_size,
            max_retries: config.batch.max_retries,
            retry_backoff_ms: config.batch.retry_backoff_ms,
            max_backoff_ms: config.batch.max_backoff_ms,
            transaction_timeout_ms: config.batch.transaction_timeout_ms,
            inter_batch_delay_ms: config.batch.inter_batch_delay_ms,
        }
    }

    /// Backoff before retry number `retry` (1-based): `base * 2^(retry-1)`,
    /// capped at `max_backoff_ms`.
    pub fn backoff(&self, retry: u32) -> Duration {
        let exp = retry.saturating_sub(1).min(20);
        let ms = self
            .retry_backoff_ms
            .saturating_mul(1u64 << exp)
            .min(self.max_backoff_ms);
        Duration::from_millis(ms)
    }

    pub fn transaction_timeout(&self) -> Duration {
        Duration::from_millis(self.transaction_timeout_ms)
    }
}
