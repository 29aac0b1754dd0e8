//! # lethe-config
//!
//! The authoritative `(AlgorithmConfig, FeatureToggles)` pair behind a
//! version counter. Reads clone an `Arc` snapshot under a short read lock.
//! Reloads queue through a single writer task that validates the merged
//! candidate before swapping it in and broadcasting the change.

pub mod events;
pub mod store;
pub mod watcher;

pub use events::{ConfigEvent, ConfigSnapshot};
pub use store::ConfigStore;
pub use watcher::ConfigWatcher;
