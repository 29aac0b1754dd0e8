//! The scheduled decay pass.
//!
//! One pass pins a config snapshot and a reference time, pages through the
//! whole store, recomputes score and status per row, and writes changed rows
//! back through the optimistic lock updater inside the page transaction.
//! An interrupted pass leaves a checkpoint that the next pass resumes from.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use lethe_config::ConfigStore;
use lethe_core::config::{AlgorithmConfig, FeatureToggles};
use lethe_core::errors::{LetheError, LetheResult, SchedulerError};
use lethe_core::memory::MemoryRow;
use lethe_core::models::{BatchStats, LockRetryConfig};
use lethe_core::traits::CancellationToken;
use lethe_decay::{DecayContext, DecayEngine, StatusTransition};
use lethe_observability::metrics::transition_key;
use lethe_observability::tracing_setup::events;
use lethe_observability::ObservabilityEngine;
use lethe_scheduler::{task_fn, TaskHandler};
use lethe_storage::{optimistic, BatchOptions, RowProcessor, StorageEngine};

/// Scheduler id of the decay task.
pub const DECAY_TASK_ID: &str = "lethe-decay";
/// Checkpoint row used to resume an interrupted pass.
pub const DECAY_CHECKPOINT: &str = "decay";

/// Summary of one finished pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecayPassReport {
    pub pass_id: String,
    pub config_version: u64,
    pub started_at: DateTime<Utc>,
    pub stats: BatchStats,
    /// Rows whose score or status was written back.
    pub updated: u64,
    pub unchanged: u64,
    /// Rows left untouched because another writer kept winning the version race.
    pub lock_conflicts: u64,
    /// Keyed `"from->to"`.
    pub transitions: BTreeMap<String, u64>,
    pub alerts_raised: usize,
    /// True when this pass continued from a stored checkpoint.
    pub resumed: bool,
}

impl DecayPassReport {
    pub fn transition_total(&self) -> u64 {
        self.transitions.values().sum()
    }
}

/// Decay pass state shared by the scheduler handler and manual runs.
pub struct DecayTask {
    storage: StorageEngine,
    config: ConfigStore,
    observability: Arc<Mutex<ObservabilityEngine>>,
    engine: DecayEngine,
    lock_retry: LockRetryConfig,
    interrupt: CancellationToken,
    last_report: Mutex<Option<DecayPassReport>>,
}

impl DecayTask {
    pub fn new(
        storage: StorageEngine,
        config: ConfigStore,
        observability: Arc<Mutex<ObservabilityEngine>>,
        lock_retry: LockRetryConfig,
    ) -> Self {
        Self {
            storage,
            config,
            observability,
            engine: DecayEngine::new(),
            lock_retry,
            interrupt: CancellationToken::new(),
            last_report: Mutex::new(None),
        }
    }

    /// Request that the pass in flight stop at its next row boundary. With no
    /// pass in flight, the next pass stops before its first row. The request
    /// is cleared when that pass ends.
    pub fn interrupt(&self) {
        self.interrupt.cancel();
    }

    pub fn last_report(&self) -> Option<DecayPassReport> {
        self.last_report
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Scheduler handler. Honors the `scheduler` toggle on every tick and
    /// runs the pass on the blocking pool.
    pub fn handler(self: &Arc<Self>) -> TaskHandler {
        let task = Arc::clone(self);
        task_fn(move || {
            let task = Arc::clone(&task);
            async move {
                if !task.config.snapshot().toggles().scheduler {
                    tracing::debug!(task_id = DECAY_TASK_ID, "scheduler toggle off, tick ignored");
                    return Ok(());
                }
                match tokio::task::spawn_blocking(move || task.run_pass()).await {
                    Ok(result) => result.map(|_| ()),
                    Err(e) => Err(SchedulerError::TaskFailed {
                        id: DECAY_TASK_ID.to_string(),
                        reason: e.to_string(),
                    }
                    .into()),
                }
            }
        })
    }

    /// Run one full pass on the calling thread. Blocks on the storage
    /// connection; call from `spawn_blocking` inside async code.
    pub fn run_pass(&self) -> LetheResult<DecayPassReport> {
        self.run_pass_at(Utc::now())
    }

    /// Run one pass with `now` as the reference time.
    pub fn run_pass_at(&self, now: DateTime<Utc>) -> LetheResult<DecayPassReport> {
        let snapshot = self.config.snapshot();
        let toggles = *snapshot.toggles();
        let pass_id = uuid::Uuid::new_v4().to_string();

        if toggles.logging {
            events::decay_pass_started(&pass_id, snapshot.version);
        }

        let result = self.execute(&pass_id, snapshot.version, snapshot.algorithm(), &toggles, now);
        self.interrupt.reset();

        match result {
            Ok(report) => {
                *self.last_report.lock().unwrap_or_else(|e| e.into_inner()) = Some(report.clone());
                Ok(report)
            }
            Err(e) => {
                if toggles.logging {
                    events::decay_pass_failed(&pass_id, &e.to_string());
                }
                Err(e)
            }
        }
    }

    fn execute(
        &self,
        pass_id: &str,
        config_version: u64,
        config: &AlgorithmConfig,
        toggles: &FeatureToggles,
        now: DateTime<Utc>,
    ) -> LetheResult<DecayPassReport> {
        let resume = self.storage.load_checkpoint(DECAY_CHECKPOINT)?;
        let options = BatchOptions::from_config(config);
        let mut processor = DecayProcessor {
            engine: self.engine,
            ctx: DecayContext { now },
            config,
            toggles,
            lock_retry: &self.lock_retry,
            tally: PassTally::default(),
        };

        let stats =
            self.storage
                .process_in_batches(&options, resume, &self.interrupt, &mut processor)?;

        if stats.interrupted {
            self.storage.save_checkpoint(DECAY_CHECKPOINT, &stats.checkpoint)?;
        } else if resume.is_some() {
            self.storage.clear_checkpoint(DECAY_CHECKPOINT)?;
        }

        let tally = processor.tally;
        let alerts = {
            let mut obs = self.observability.lock().unwrap_or_else(|e| e.into_inner());
            for _ in 0..tally.updated {
                obs.record_lock_outcome(false);
            }
            for _ in 0..tally.lock_conflicts {
                obs.record_lock_outcome(true);
            }
            obs.record_decay_pass(&stats, &tally.transitions)
        };

        if toggles.logging {
            for (key, transition, score) in &tally.changes {
                events::status_transition(key, transition.from, transition.to, *score);
            }
            for (key, expected, actual) in &tally.conflicts {
                events::lock_conflict(key, *expected, *actual);
            }
            events::decay_pass_completed(pass_id, &stats, tally.transitions.values().sum());
        }

        Ok(DecayPassReport {
            pass_id: pass_id.to_string(),
            config_version,
            started_at: now,
            stats,
            updated: tally.updated,
            unchanged: tally.unchanged,
            lock_conflicts: tally.lock_conflicts,
            transitions: tally.transitions,
            alerts_raised: alerts.len(),
            resumed: resume.is_some(),
        })
    }
}

// ── Row processing ──

enum RowOutcome {
    Unchanged,
    Updated {
        key: String,
        score: f64,
        transition: Option<StatusTransition>,
    },
    Conflict {
        key: String,
        expected: u64,
        actual: u64,
    },
}

/// Counts from committed pages only.
#[derive(Default)]
struct PassTally {
    updated: u64,
    unchanged: u64,
    lock_conflicts: u64,
    transitions: BTreeMap<String, u64>,
    changes: Vec<(String, StatusTransition, f64)>,
    conflicts: Vec<(String, u64, u64)>,
}

struct DecayProcessor<'a> {
    engine: DecayEngine,
    ctx: DecayContext,
    config: &'a AlgorithmConfig,
    toggles: &'a FeatureToggles,
    lock_retry: &'a LockRetryConfig,
    tally: PassTally,
}

impl RowProcessor for DecayProcessor<'_> {
    type Outcome = RowOutcome;

    fn process(&mut self, conn: &Connection, row: &MemoryRow) -> LetheResult<RowOutcome> {
        let outcome = self
            .engine
            .evaluate(&row.meta, row.score, &self.ctx, self.config, self.toggles)?;
        if !outcome.changed() {
            return Ok(RowOutcome::Unchanged);
        }

        let written = optimistic::update_with_lock(
            conn,
            &row.key,
            row.meta.version,
            &outcome.patch(),
            Some(outcome.score),
            self.lock_retry,
        );
        match written {
            Ok(_) => Ok(RowOutcome::Updated {
                key: row.key.clone(),
                score: outcome.score,
                transition: outcome.transition(),
            }),
            // The row is re-evaluated on the next pass.
            Err(LetheError::OptimisticLockConflict {
                expected_version,
                actual_version,
                ..
            }) => Ok(RowOutcome::Conflict {
                key: row.key.clone(),
                expected: expected_version,
                actual: actual_version,
            }),
            Err(e) => Err(e),
        }
    }

    fn committed(&mut self, outcomes: Vec<RowOutcome>) {
        for outcome in outcomes {
            match outcome {
                RowOutcome::Unchanged => self.tally.unchanged += 1,
                RowOutcome::Updated {
                    key,
                    score,
                    transition,
                } => {
                    self.tally.updated += 1;
                    if let Some(t) = transition {
                        *self
                            .tally
                            .transitions
                            .entry(transition_key(t.from, t.to))
                            .or_insert(0) += 1;
                        self.tally.changes.push((key, t, score));
                    }
                }
                RowOutcome::Conflict {
                    key,
                    expected,
                    actual,
                } => {
                    self.tally.lock_conflicts += 1;
                    self.tally.conflicts.push((key, expected, actual));
                }
            }
        }
    }
}
