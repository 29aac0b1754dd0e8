//! Task registry and lifecycle control.

use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use lethe_core::errors::{LetheResult, SchedulerError};

use crate::runner;
use crate::task::{TaskEntry, TaskHandler, TaskSnapshot, TaskStatus};

/// Aggregate health view. Tasks are sorted by id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchedulerSnapshot {
    pub total_task_count: usize,
    pub running_task_count: usize,
    pub paused_task_count: usize,
    pub stopped_task_count: usize,
    pub tasks: Vec<TaskSnapshot>,
}

/// Registry of repeating tasks. Cheap to clone; clones share the registry.
///
/// `start` and `run_now` spawn onto the ambient tokio runtime and must be
/// called from within one.
#[derive(Clone, Default)]
pub struct Scheduler {
    tasks: Arc<DashMap<String, Arc<TaskEntry>>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a task in the `idle` state.
    pub fn register(
        &self,
        id: impl Into<String>,
        interval_ms: u64,
        handler: TaskHandler,
    ) -> LetheResult<()> {
        let id = id.into();
        if interval_ms == 0 {
            return Err(SchedulerError::InvalidInterval { id, interval_ms }.into());
        }
        match self.tasks.entry(id.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                Err(SchedulerError::DuplicateTask { id }.into())
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(Arc::new(TaskEntry::new(id.clone(), interval_ms, handler)));
                tracing::debug!(task_id = %id, interval_ms, "task registered");
                Ok(())
            }
        }
    }

    /// idle → running. The first tick fires one interval after start.
    pub fn start(&self, id: &str) -> LetheResult<()> {
        let entry = self.entry(id)?;
        transition(&entry, &[TaskStatus::Idle], TaskStatus::Running)?;
        let handle = tokio::spawn(runner::run_loop(Arc::clone(&entry)));
        *entry.loop_handle.lock().unwrap_or_else(|e| e.into_inner()) = Some(handle);
        tracing::info!(task_id = %id, interval_ms = entry.interval_ms(), "task started");
        Ok(())
    }

    /// running → paused. Ticks keep arriving but do not execute.
    pub fn pause(&self, id: &str) -> LetheResult<()> {
        let entry = self.entry(id)?;
        transition(&entry, &[TaskStatus::Running], TaskStatus::Paused)?;
        tracing::info!(task_id = %id, "task paused");
        Ok(())
    }

    pub fn resume(&self, id: &str) -> LetheResult<()> {
        let entry = self.entry(id)?;
        transition(&entry, &[TaskStatus::Paused], TaskStatus::Running)?;
        tracing::info!(task_id = %id, "task resumed");
        Ok(())
    }

    /// Any non-stopped state → stopped. Terminal. A run already in flight
    /// finishes and is recorded.
    pub fn stop(&self, id: &str) -> LetheResult<()> {
        let entry = self.entry(id)?;
        transition(
            &entry,
            &[TaskStatus::Idle, TaskStatus::Running, TaskStatus::Paused],
            TaskStatus::Stopped,
        )?;
        entry.wake.notify_one();
        entry.abort_loop();
        entry.with_metrics(|m| m.next_run_at = None);
        tracing::info!(task_id = %id, "task stopped");
        Ok(())
    }

    /// Stop every task that is not already stopped.
    pub fn stop_all(&self) {
        let ids: Vec<String> = self
            .tasks
            .iter()
            .filter(|e| e.value().status() != TaskStatus::Stopped)
            .map(|e| e.key().clone())
            .collect();
        for id in ids {
            // Lost race with a concurrent stop.
            if let Err(e) = self.stop(&id) {
                tracing::debug!(task_id = %id, error = %e, "stop_all skipped task");
            }
        }
    }

    /// Change a task's interval. The running loop re-arms immediately.
    pub fn set_interval(&self, id: &str, interval_ms: u64) -> LetheResult<()> {
        if interval_ms == 0 {
            return Err(SchedulerError::InvalidInterval {
                id: id.to_string(),
                interval_ms,
            }
            .into());
        }
        let entry = self.entry(id)?;
        let previous = entry
            .interval_ms
            .swap(interval_ms, std::sync::atomic::Ordering::SeqCst);
        if previous != interval_ms {
            entry.wake.notify_one();
            tracing::info!(task_id = %id, previous, interval_ms, "task interval changed");
        }
        Ok(())
    }

    /// Execute one run now and wait for it. Returns `false` without running
    /// when a run is already in flight; that counts as a skipped tick.
    pub async fn run_now(&self, id: &str) -> LetheResult<bool> {
        let entry = self.entry(id)?;
        let status = entry.status();
        if status == TaskStatus::Stopped {
            return Err(SchedulerError::InvalidTransition {
                id: id.to_string(),
                from: status.to_string(),
                to: "run".to_string(),
            }
            .into());
        }
        if !entry.try_claim() {
            entry.with_metrics(|m| m.skipped_ticks += 1);
            return Ok(false);
        }
        runner::execute_claimed(entry).await;
        Ok(true)
    }

    pub fn status(&self, id: &str) -> LetheResult<TaskStatus> {
        Ok(self.entry(id)?.status())
    }

    pub fn is_executing(&self, id: &str) -> LetheResult<bool> {
        Ok(self.entry(id)?.is_in_flight())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.tasks.contains_key(id)
    }

    pub fn task_snapshot(&self, id: &str) -> LetheResult<TaskSnapshot> {
        Ok(self.entry(id)?.snapshot())
    }

    pub fn snapshot(&self) -> SchedulerSnapshot {
        let mut tasks: Vec<TaskSnapshot> = self.tasks.iter().map(|e| e.value().snapshot()).collect();
        tasks.sort_by(|a, b| a.id.cmp(&b.id));

        let count = |status: TaskStatus| tasks.iter().filter(|t| t.status == status).count();
        SchedulerSnapshot {
            total_task_count: tasks.len(),
            running_task_count: count(TaskStatus::Running),
            paused_task_count: count(TaskStatus::Paused),
            stopped_task_count: count(TaskStatus::Stopped),
            tasks,
        }
    }

    fn entry(&self, id: &str) -> LetheResult<Arc<TaskEntry>> {
        self.tasks
            .get(id)
            .map(|e| Arc::clone(e.value()))
            .ok_or_else(|| SchedulerError::TaskNotFound { id: id.to_string() }.into())
    }
}

/// Check-and-set under the status lock.
fn transition(entry: &TaskEntry, allowed: &[TaskStatus], to: TaskStatus) -> LetheResult<()> {
    let mut status = entry.status.lock().unwrap_or_else(|e| e.into_inner());
    if !allowed.contains(&status) {
        return Err(SchedulerError::InvalidTransition {
            id: entry.id.clone(),
            from: status.to_string(),
            to: to.to_string(),
        }
        .into());
    }
    *status = to;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> TaskHandler {
        crate::task::task_fn(|| async { Ok::<(), lethe_core::LetheError>(()) })
    }

    #[test]
    fn empty_snapshot() {
        let snapshot = Scheduler::new().snapshot();
        assert_eq!(snapshot.total_task_count, 0);
        assert!(snapshot.tasks.is_empty());
    }

    #[test]
    fn pause_from_idle_is_invalid() {
        let scheduler = Scheduler::new();
        scheduler.register("t", 100, noop()).unwrap();
        let err = scheduler.pause("t").unwrap_err();
        assert!(err.to_string().contains("idle"));
        assert_eq!(scheduler.status("t").unwrap(), TaskStatus::Idle);
    }

    #[test]
    fn stop_from_idle_is_terminal() {
        let scheduler = Scheduler::new();
        scheduler.register("t", 100, noop()).unwrap();
        scheduler.stop("t").unwrap();
        assert!(scheduler.stop("t").is_err());
        assert!(scheduler.resume("t").is_err());
    }
}
