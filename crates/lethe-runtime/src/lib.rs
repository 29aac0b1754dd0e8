//! # lethe-runtime
//!
//! [`LetheRuntime`] owns every engine (storage, config store, observability,
//! scheduler) and registers the [`DecayTask`], which recomputes scores and
//! lifecycle status for the whole store on each scheduled tick.

pub mod decay_task;
pub mod listener;
pub mod options;
pub mod runtime;

pub use decay_task::{DecayPassReport, DecayTask, DECAY_CHECKPOINT, DECAY_TASK_ID};
pub use options::RuntimeOptions;
pub use runtime::{HealthReport, LetheRuntime};
