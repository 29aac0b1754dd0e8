//! # lethe-decay
//!
//! Vitality scoring: time decay, usage boost, structure boost, clamped into
//! the configured score range, then classified into a lifecycle state.

pub mod classifier;
pub mod engine;
pub mod factors;
pub mod formula;

pub use classifier::{classify, transition, StatusTransition};
pub use engine::{DecayContext, DecayEngine, DecayOutcome};
pub use formula::{calculate_breakdown, calculate_memory_score, ScoreBreakdown, ScoreInput};
