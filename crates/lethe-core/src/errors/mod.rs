//! Error taxonomy. One top-level [`LetheError`] with per-subsystem enums
//! folded in through `#[from]`.

mod config_error;
mod input_error;
mod scheduler_error;
mod storage_error;

pub use config_error::ConfigError;
pub use input_error::InputValidationError;
pub use scheduler_error::SchedulerError;
pub use storage_error::StorageError;

/// Result alias used across the workspace.
pub type LetheResult<T> = Result<T, LetheError>;

/// Top-level error type for every Lethe subsystem.
#[derive(Debug, thiserror::Error)]
pub enum LetheError {
    #[error("memory not found: {key}")]
    MemoryNotFound { key: String },

    #[error("invalid input: {0}")]
    InputValidation(#[from] InputValidationError),

    #[error(
        "optimistic lock conflict on {key}: expected version {expected_version}, actual version {actual_version}"
    )]
    OptimisticLockConflict {
        key: String,
        expected_version: u64,
        actual_version: u64,
    },

    #[error("transaction timed out after {elapsed_ms}ms (limit {limit_ms}ms)")]
    TransactionTimeout { elapsed_ms: u64, limit_ms: u64 },

    #[error("batch at offset {offset} failed after {attempts} attempts: {reason}")]
    BatchFailed {
        offset: u64,
        attempts: u32,
        reason: String,
    },

    #[error("operation interrupted")]
    Interrupted,

    #[error("config error: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("scheduler error: {0}")]
    SchedulerError(#[from] SchedulerError),

    #[error("storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl LetheError {
    /// Whether a caller may usefully retry the failed operation.
    ///
    /// Lock conflicts, timeouts and storage hiccups are transient. Validation,
    /// missing keys and configuration mistakes are not.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::OptimisticLockConflict { .. }
                | Self::TransactionTimeout { .. }
                | Self::StorageError(StorageError::SqliteError { .. })
        )
    }

    /// Short machine-readable kind, used as a log/metric label.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MemoryNotFound { .. } => "not_found",
            Self::InputValidation(_) => "input_validation",
            Self::OptimisticLockConflict { .. } => "lock_conflict",
            Self::TransactionTimeout { .. } => "transaction_timeout",
            Self::BatchFailed { .. } => "batch_failed",
            Self::Interrupted => "interrupted",
            Self::ConfigError(_) => "config",
            Self::SchedulerError(_) => "scheduler",
            Self::StorageError(_) => "storage",
            Self::SerializationError(_) => "serialization",
        }
    }
}
