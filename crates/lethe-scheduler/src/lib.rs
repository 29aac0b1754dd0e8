//! # lethe-scheduler
//!
//! Runs registered handlers on fixed intervals, one tokio loop per task.
//! A task never overlaps itself: a tick that lands while the previous run
//! is still executing is skipped and counted.

pub mod runner;
pub mod scheduler;
pub mod task;

pub use scheduler::{Scheduler, SchedulerSnapshot};
pub use task::{task_fn, TaskFuture, TaskHandler, TaskMetrics, TaskSnapshot, TaskStatus};
