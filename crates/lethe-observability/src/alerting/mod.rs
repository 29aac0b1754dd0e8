//! Threshold alerting: one live alert per metric, delivered to sinks.

pub mod manager;
pub mod sinks;

pub use manager::{AlertEvent, AlertEventKind, AlertManager};
pub use sinks::{AlertCallback, AlertSink, CallbackSink, ConsoleSink, FileSink};
