pub mod alert;
pub mod batch_stats;
pub mod checkpoint;
pub mod lock_retry;

pub use alert::{AlertSeverity, AlertState, PerformanceAlert};
pub use batch_stats::BatchStats;
pub use checkpoint::Checkpoint;
pub use lock_retry::LockRetryConfig;
