//! Pass counts, durations, batch failures, lifecycle transitions.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use lethe_core::memory::LifecycleStatus;
use lethe_core::models::BatchStats;

/// Duration samples kept for the rolling average.
const MAX_DURATION_SAMPLES: usize = 100;

/// Label for a lifecycle transition, e.g. `active->cold`.
pub fn transition_key(from: LifecycleStatus, to: LifecycleStatus) -> String {
    format!("{from}->{to}")
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecayMetrics {
    pub total_passes: u64,
    pub clean_passes: u64,
    pub interrupted_passes: u64,
    pub memories_processed_total: u64,
    pub batches_processed_total: u64,
    pub failed_batches_total: u64,
    pub retries_total: u64,
    /// Failed pages in the most recent pass.
    pub last_failed_batches: u64,
    pub last_retry_count: u64,
    pub last_pass_duration_ms: u64,
    pub last_pass_at: Option<DateTime<Utc>>,
    /// Cumulative transition counts keyed by [`transition_key`].
    pub transitions: BTreeMap<String, u64>,
    durations: Vec<u64>,
}

impl DecayMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_pass(&mut self, stats: &BatchStats, transitions: &BTreeMap<String, u64>) {
        self.total_passes += 1;
        if stats.is_clean() {
            self.clean_passes += 1;
        }
        if stats.interrupted {
            self.interrupted_passes += 1;
        }
        self.memories_processed_total += stats.processed_memories;
        self.batches_processed_total += stats.processed_batches;
        self.failed_batches_total += stats.failed_batches;
        self.retries_total += stats.retry_count;
        self.last_failed_batches = stats.failed_batches;
        self.last_retry_count = stats.retry_count;
        self.last_pass_duration_ms = stats.duration_ms;
        self.last_pass_at = Some(Utc::now());

        for (key, count) in transitions {
            *self.transitions.entry(key.clone()).or_insert(0) += count;
        }

        self.durations.push(stats.duration_ms);
        if self.durations.len() > MAX_DURATION_SAMPLES {
            self.durations
                .drain(..self.durations.len() - MAX_DURATION_SAMPLES);
        }
    }

    pub fn avg_pass_duration_ms(&self) -> f64 {
        if self.durations.is_empty() {
            return 0.0;
        }
        self.durations.iter().sum::<u64>() as f64 / self.durations.len() as f64
    }

    pub fn transition_count(&self, from: LifecycleStatus, to: LifecycleStatus) -> u64 {
        self.transitions
            .get(&transition_key(from, to))
            .copied()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_across_passes() {
        let mut m = DecayMetrics::new();
        let mut transitions = BTreeMap::new();
        transitions.insert(
            transition_key(LifecycleStatus::Active, LifecycleStatus::Cold),
            3,
        );
        let stats = BatchStats {
            processed_memories: 10,
            processed_batches: 2,
            failed_batches: 1,
            duration_ms: 40,
            ..Default::default()
        };
        m.record_pass(&stats, &transitions);
        m.record_pass(
            &BatchStats {
                duration_ms: 20,
                ..Default::default()
            },
            &transitions,
        );

        assert_eq!(m.total_passes, 2);
        assert_eq!(m.clean_passes, 1);
        assert_eq!(m.failed_batches_total, 1);
        assert_eq!(m.last_failed_batches, 0);
        assert_eq!(m.avg_pass_duration_ms(), 30.0);
        assert_eq!(
            m.transition_count(LifecycleStatus::Active, LifecycleStatus::Cold),
            6
        );
    }
}
