//! # lethe-observability
//!
//! Metrics for decay passes, lock contention and config reloads; threshold
//! alerting with console, file and callback sinks; a size-rotated file
//! writer shared by alert files and log output; and tracing setup with
//! structured event helpers.

pub mod alerting;
pub mod engine;
pub mod metrics;
pub mod tracing_setup;
pub mod writer;

pub use alerting::{AlertCallback, AlertEvent, AlertEventKind, AlertManager, AlertSink};
pub use engine::{ObservabilityEngine, ObservabilitySnapshot};
pub use metrics::MetricsCollector;
pub use writer::RotatingFileWriter;
