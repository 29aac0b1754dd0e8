//! Alert delivery targets. Delivery failures are reported to the manager,
//! which logs and drops them.

use std::io;
use std::sync::Arc;

use lethe_core::models::AlertSeverity;

use super::manager::{AlertEvent, AlertEventKind};
use crate::writer::RotatingFileWriter;

pub trait AlertSink: Send + Sync {
    fn name(&self) -> &'static str;

    fn deliver(&self, event: &AlertEvent) -> io::Result<()>;
}

/// Emits alerts as tracing events.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl AlertSink for ConsoleSink {
    fn name(&self) -> &'static str {
        "console"
    }

    fn deliver(&self, event: &AlertEvent) -> io::Result<()> {
        let alert = &event.alert;
        match (event.kind, alert.severity) {
            (AlertEventKind::Recovered, _) | (AlertEventKind::Unsilenced, _) => tracing::info!(
                event = "alert",
                kind = ?event.kind,
                metric = %alert.metric,
                value = alert.value,
                "alert {:?}: {}",
                event.kind,
                alert.metric
            ),
            (_, AlertSeverity::Critical) => tracing::error!(
                event = "alert",
                kind = ?event.kind,
                metric = %alert.metric,
                value = alert.value,
                severity = "critical",
                "alert {:?}: {}",
                event.kind,
                alert.metric
            ),
            (_, AlertSeverity::Warning) => tracing::warn!(
                event = "alert",
                kind = ?event.kind,
                metric = %alert.metric,
                value = alert.value,
                severity = "warning",
                "alert {:?}: {}",
                event.kind,
                alert.metric
            ),
        }
        Ok(())
    }
}

/// Appends one JSON object per alert event to a rotating file.
#[derive(Debug)]
pub struct FileSink {
    writer: RotatingFileWriter,
}

impl FileSink {
    pub fn new(writer: RotatingFileWriter) -> Self {
        Self { writer }
    }

    pub fn writer(&self) -> &RotatingFileWriter {
        &self.writer
    }
}

impl AlertSink for FileSink {
    fn name(&self) -> &'static str {
        "file"
    }

    fn deliver(&self, event: &AlertEvent) -> io::Result<()> {
        let line = serde_json::to_string(event)?;
        self.writer.write_line(&line)
    }
}

/// Caller-supplied alert hook.
pub type AlertCallback = Arc<dyn Fn(&AlertEvent) + Send + Sync>;

pub struct CallbackSink {
    callback: AlertCallback,
}

impl CallbackSink {
    pub fn new(callback: AlertCallback) -> Self {
        Self { callback }
    }
}

impl AlertSink for CallbackSink {
    fn name(&self) -> &'static str {
        "callback"
    }

    fn deliver(&self, event: &AlertEvent) -> io::Result<()> {
        // Panics surface as a delivery failure.
        std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| (self.callback)(event)))
            .map_err(|_| io::Error::other("alert callback panicked"))
    }
}
