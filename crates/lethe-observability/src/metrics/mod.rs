//! Central metrics registry.
//!
//! [`MetricsCollector`] owns the per-concern collectors and resolves metric
//! names used by alert rules.

pub mod config_metrics;
pub mod decay_metrics;
pub mod lock_metrics;

pub use config_metrics::ConfigMetrics;
pub use decay_metrics::{transition_key, DecayMetrics};
pub use lock_metrics::LockMetrics;

#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct MetricsCollector {
    pub decay: DecayMetrics,
    pub locks: LockMetrics,
    pub config: ConfigMetrics,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset all metrics (useful for testing or periodic rotation).
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Current value of a named metric, as referenced by alert rules.
    pub fn value(&self, metric: &str) -> Option<f64> {
        let v = match metric {
            "failed_batches" => self.decay.last_failed_batches as f64,
            "failed_batches_total" => self.decay.failed_batches_total as f64,
            "retry_count" => self.decay.last_retry_count as f64,
            "pass_duration_ms" => self.decay.last_pass_duration_ms as f64,
            "avg_pass_duration_ms" => self.decay.avg_pass_duration_ms(),
            "interrupted_passes" => self.decay.interrupted_passes as f64,
            "lock_conflict_rate" => self.locks.conflict_rate(),
            "lock_conflicts" => self.locks.conflicts as f64,
            "config_reloads_rejected" => self.config.reloads_rejected as f64,
            _ => return None,
        };
        Some(v)
    }
}
