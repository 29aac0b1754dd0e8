//! # lethe-core
//!
//! Foundation crate for the Lethe decay engine.
//! Defines the memory data model, errors, config, storage contract, and defaults.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod errors;
pub mod memory;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::{AlgorithmConfig, EngineConfig, FeatureToggles};
pub use errors::{LetheError, LetheResult};
pub use memory::{LifecycleStatus, MemoryMeta, MemoryRow, MetaPatch};
pub use models::{BatchStats, Checkpoint, LockRetryConfig};
pub use traits::{Cancellable, CancellationToken, MemoryStore};
