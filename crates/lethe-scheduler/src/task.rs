//! Task state shared between the scheduler handle and the task's loop.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use lethe_core::errors::LetheResult;

pub type TaskFuture = Pin<Box<dyn Future<Output = LetheResult<()>> + Send>>;

/// Produces one run of a task. Called once per executed tick.
pub type TaskHandler = Arc<dyn Fn() -> TaskFuture + Send + Sync>;

/// Wrap an async closure as a [`TaskHandler`].
pub fn task_fn<F, Fut>(f: F) -> TaskHandler
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = LetheResult<()>> + Send + 'static,
{
    Arc::new(move || -> TaskFuture { Box::pin(f()) })
}

/// idle →start→ running ⇄ paused; any non-stopped state →stop→ stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Idle,
    Running,
    Paused,
    Stopped,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Stopped => "stopped",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskMetrics {
    pub run_count: u64,
    pub success_count: u64,
    pub failure_count: u64,
    /// Ticks dropped because the previous run was still executing.
    pub skipped_ticks: u64,
    pub last_run_at: Option<DateTime<Utc>>,
    pub next_run_at: Option<DateTime<Utc>>,
    pub last_error_message: Option<String>,
    pub last_duration_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSnapshot {
    pub id: String,
    pub interval_ms: u64,
    pub status: TaskStatus,
    pub metrics: TaskMetrics,
}

pub(crate) struct TaskEntry {
    pub(crate) id: String,
    pub(crate) interval_ms: AtomicU64,
    pub(crate) status: Mutex<TaskStatus>,
    pub(crate) metrics: Mutex<TaskMetrics>,
    pub(crate) in_flight: AtomicBool,
    pub(crate) handler: TaskHandler,
    /// Wakes the loop after an interval change.
    pub(crate) wake: Notify,
    pub(crate) loop_handle: Mutex<Option<JoinHandle<()>>>,
}

impl TaskEntry {
    pub(crate) fn new(id: String, interval_ms: u64, handler: TaskHandler) -> Self {
        Self {
            id,
            interval_ms: AtomicU64::new(interval_ms),
            status: Mutex::new(TaskStatus::Idle),
            metrics: Mutex::new(TaskMetrics::default()),
            in_flight: AtomicBool::new(false),
            handler,
            wake: Notify::new(),
            loop_handle: Mutex::new(None),
        }
    }

    pub(crate) fn status(&self) -> TaskStatus {
        *self.status.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub(crate) fn set_status(&self, status: TaskStatus) {
        *self.status.lock().unwrap_or_else(|e| e.into_inner()) = status;
    }

    pub(crate) fn interval_ms(&self) -> u64 {
        self.interval_ms.load(Ordering::SeqCst)
    }

    pub(crate) fn with_metrics<T>(&self, f: impl FnOnce(&mut TaskMetrics) -> T) -> T {
        let mut guard = self.metrics.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut guard)
    }

    /// Claim the single execution slot. False when a run is in flight.
    pub(crate) fn try_claim(&self) -> bool {
        self.in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    pub(crate) fn release(&self) {
        self.in_flight.store(false, Ordering::SeqCst);
    }

    pub(crate) fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub(crate) fn snapshot(&self) -> TaskSnapshot {
        TaskSnapshot {
            id: self.id.clone(),
            interval_ms: self.interval_ms(),
            status: self.status(),
            metrics: self.with_metrics(|m| m.clone()),
        }
    }

    pub(crate) fn abort_loop(&self) {
        if let Some(handle) = self
            .loop_handle
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        {
            handle.abort();
        }
    }
}
