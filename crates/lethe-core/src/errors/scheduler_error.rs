/// Scheduler registration, lifecycle, and task execution errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchedulerError {
    #[error("task {id} is already registered")]
    DuplicateTask { id: String },

    #[error("task {id} has invalid interval {interval_ms}ms; must be > 0")]
    InvalidInterval { id: String, interval_ms: u64 },

    #[error("task {id} is not registered")]
    TaskNotFound { id: String },

    #[error("task {id} cannot go from {from} to {to}")]
    InvalidTransition {
        id: String,
        from: String,
        to: String,
    },

    #[error("task {id} failed: {reason}")]
    TaskFailed { id: String, reason: String },
}
