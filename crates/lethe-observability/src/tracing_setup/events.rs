//! Structured log events for key engine operations.
//!
//! Each function emits a `tracing` event with an `event` field naming it.

use lethe_core::memory::LifecycleStatus;
use lethe_core::models::BatchStats;

pub fn decay_pass_started(pass_id: &str, config_version: u64) {
    tracing::info!(
        event = "decay_pass_started",
        pass_id = %pass_id,
        config_version = config_version,
        "decay pass started"
    );
}

pub fn decay_pass_completed(pass_id: &str, stats: &BatchStats, transitions: u64) {
    tracing::info!(
        event = "decay_pass_completed",
        pass_id = %pass_id,
        total = stats.total_memories,
        processed = stats.processed_memories,
        batches = stats.processed_batches,
        failed_batches = stats.failed_batches,
        retries = stats.retry_count,
        interrupted = stats.interrupted,
        transitions = transitions,
        duration_ms = stats.duration_ms,
        "decay pass completed"
    );
}

pub fn decay_pass_failed(pass_id: &str, error: &str) {
    tracing::error!(
        event = "decay_pass_failed",
        pass_id = %pass_id,
        error = %error,
        "decay pass failed"
    );
}

pub fn status_transition(key: &str, from: LifecycleStatus, to: LifecycleStatus, score: f64) {
    tracing::debug!(
        event = "status_transition",
        key = %key,
        from = %from,
        to = %to,
        score = score,
        "lifecycle status changed"
    );
}

pub fn lock_conflict(key: &str, expected_version: u64, actual_version: u64) {
    tracing::warn!(
        event = "lock_conflict",
        key = %key,
        expected_version = expected_version,
        actual_version = actual_version,
        "optimistic lock conflict"
    );
}
