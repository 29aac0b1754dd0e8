//! Per-task tick loop and single-run execution.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::Instant;

use crate::task::{TaskEntry, TaskStatus};

/// Tick loop. Exits when the task is stopped; the scheduler also aborts it.
pub(crate) async fn run_loop(entry: Arc<TaskEntry>) {
    let mut next = Instant::now() + interval(&entry);
    loop {
        set_next_run(&entry, next);
        tokio::select! {
            _ = tokio::time::sleep_until(next) => {}
            _ = entry.wake.notified() => {
                if entry.status() == TaskStatus::Stopped {
                    return;
                }
                next = Instant::now() + interval(&entry);
                continue;
            }
        }

        match entry.status() {
            TaskStatus::Stopped => return,
            TaskStatus::Running => tick(&entry),
            TaskStatus::Paused | TaskStatus::Idle => {}
        }

        next += interval(&entry);
        let now = Instant::now();
        if next <= now {
            // Fell behind; don't replay missed ticks in a burst.
            next = now + interval(&entry);
        }
    }
}

/// Start a run in the background, or count a skip when one is in flight.
pub(crate) fn tick(entry: &Arc<TaskEntry>) {
    if !entry.try_claim() {
        entry.with_metrics(|m| m.skipped_ticks += 1);
        tracing::debug!(task_id = %entry.id, "tick skipped, previous run still executing");
        return;
    }
    tokio::spawn(execute_claimed(Arc::clone(entry)));
}

/// Run the handler once. The caller must hold the execution slot.
///
/// The handler runs in its own task so a panic surfaces as a `JoinError`
/// and is recorded like any other failure.
pub(crate) async fn execute_claimed(entry: Arc<TaskEntry>) {
    let started = Instant::now();
    entry.with_metrics(|m| m.last_run_at = Some(Utc::now()));

    let handler = Arc::clone(&entry.handler);
    let outcome = tokio::spawn(async move { handler().await }).await;

    let error = match outcome {
        Ok(Ok(())) => None,
        Ok(Err(e)) => Some(e.to_string()),
        Err(join) if join.is_panic() => Some(format!("task panicked: {}", panic_message(join))),
        Err(join) => Some(format!("task cancelled: {join}")),
    };

    let elapsed_ms = started.elapsed().as_millis() as u64;
    entry.with_metrics(|m| {
        m.run_count += 1;
        m.last_duration_ms = Some(elapsed_ms);
        match &error {
            None => {
                m.success_count += 1;
                m.last_error_message = None;
            }
            Some(msg) => {
                m.failure_count += 1;
                m.last_error_message = Some(msg.clone());
            }
        }
    });
    if let Some(msg) = &error {
        tracing::warn!(
            event = "task_failed",
            task_id = %entry.id,
            error = %msg,
            "scheduled task failed"
        );
    }
    entry.release();
}

fn interval(entry: &TaskEntry) -> Duration {
    Duration::from_millis(entry.interval_ms().max(1))
}

fn set_next_run(entry: &TaskEntry, next: Instant) {
    let wait = next.saturating_duration_since(Instant::now());
    let at = chrono::Duration::from_std(wait)
        .ok()
        .and_then(|d| Utc::now().checked_add_signed(d));
    entry.with_metrics(|m| m.next_run_at = at);
}

fn panic_message(join: tokio::task::JoinError) -> String {
    let payload = join.into_panic();
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
