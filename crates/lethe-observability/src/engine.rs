//! [`ObservabilityEngine`]: owns metrics and alerting, and applies alert
//! rules after each recorded sample.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use lethe_core::config::{AlertSinkKind, ObservabilityConfig};
use lethe_core::errors::ConfigError;
use lethe_core::models::{BatchStats, PerformanceAlert};

use crate::alerting::{
    AlertCallback, AlertEvent, AlertManager, CallbackSink, ConsoleSink, FileSink,
};
use crate::metrics::MetricsCollector;
use crate::writer::RotatingFileWriter;

/// Point-in-time copy of metrics and alerts.
#[derive(Debug, Clone, Serialize)]
pub struct ObservabilitySnapshot {
    pub metrics: MetricsCollector,
    pub alerts: Vec<PerformanceAlert>,
    pub alerting_enabled: bool,
    pub logging_enabled: bool,
}

#[derive(Debug)]
pub struct ObservabilityEngine {
    pub metrics: MetricsCollector,
    pub alerts: AlertManager,
    logging_enabled: bool,
}

impl ObservabilityEngine {
    /// Build with sinks chosen by `config`. A `Callback` sink is attached
    /// only when `callback` is supplied.
    pub fn new(
        config: &ObservabilityConfig,
        callback: Option<AlertCallback>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut alerts = AlertManager::new(config.rules.clone());
        for kind in &config.alert_sinks {
            match kind {
                AlertSinkKind::Console => alerts.add_sink(Box::new(ConsoleSink)),
                AlertSinkKind::File => {
                    let writer = RotatingFileWriter::open(
                        &config.alert_file_path,
                        config.max_file_bytes,
                        config.max_generations,
                    )
                    .map_err(|e| ConfigError::Io {
                        path: config.alert_file_path.clone(),
                        reason: e.to_string(),
                    })?;
                    alerts.add_sink(Box::new(FileSink::new(writer)));
                }
                AlertSinkKind::Callback => {
                    if let Some(cb) = &callback {
                        alerts.add_sink(Box::new(CallbackSink::new(cb.clone())));
                    }
                }
            }
        }
        Ok(Self {
            metrics: MetricsCollector::new(),
            alerts,
            logging_enabled: true,
        })
    }

    /// Console sink and default rules only.
    pub fn with_defaults() -> Self {
        let mut alerts = AlertManager::new(lethe_core::config::default_rules());
        alerts.add_sink(Box::new(ConsoleSink));
        Self {
            metrics: MetricsCollector::new(),
            alerts,
            logging_enabled: true,
        }
    }

    /// Mirror the `alerting` and `logging` feature toggles.
    pub fn apply_toggles(&mut self, alerting: bool, logging: bool) {
        self.alerts.set_enabled(alerting);
        self.logging_enabled = logging;
    }

    pub fn logging_enabled(&self) -> bool {
        self.logging_enabled
    }

    /// Record a finished decay pass and evaluate every rule.
    pub fn record_decay_pass(
        &mut self,
        stats: &BatchStats,
        transitions: &BTreeMap<String, u64>,
    ) -> Vec<AlertEvent> {
        self.metrics.decay.record_pass(stats, transitions);
        let context = serde_json::json!({
            "total_memories": stats.total_memories,
            "processed_memories": stats.processed_memories,
            "failed_batches": stats.failed_batches,
            "last_error": stats.last_error,
        });
        self.evaluate_rules(context, Utc::now())
    }

    pub fn record_lock_outcome(&mut self, conflict: bool) {
        self.metrics.locks.record(conflict);
    }

    pub fn record_config_reload(&mut self, version: u64) {
        self.metrics.config.record_applied(version);
    }

    pub fn record_config_rejected(&mut self) -> Vec<AlertEvent> {
        self.metrics.config.record_rejected();
        self.evaluate_rules(serde_json::Value::Null, Utc::now())
    }

    /// Evaluate each rule against the current metric values.
    pub fn evaluate_rules(
        &mut self,
        context: serde_json::Value,
        now: DateTime<Utc>,
    ) -> Vec<AlertEvent> {
        let samples: Vec<(String, f64)> = self
            .alerts
            .rules()
            .iter()
            .filter_map(|r| self.metrics.value(&r.metric).map(|v| (r.metric.clone(), v)))
            .collect();
        samples
            .into_iter()
            .filter_map(|(metric, value)| self.alerts.evaluate(&metric, value, context.clone(), now))
            .collect()
    }

    pub fn silence_alert(&mut self, metric: &str, until: Option<DateTime<Utc>>) -> bool {
        self.alerts.silence(metric, until, Utc::now())
    }

    pub fn unsilence_alert(&mut self, metric: &str) -> bool {
        self.alerts.unsilence(metric, Utc::now())
    }

    /// Reset all metrics (for testing or periodic rotation).
    pub fn reset_metrics(&mut self) {
        self.metrics.reset();
    }

    pub fn snapshot(&self) -> ObservabilitySnapshot {
        ObservabilitySnapshot {
            metrics: self.metrics.clone(),
            alerts: self.alerts.live_alerts(),
            alerting_enabled: self.alerts.is_enabled(),
            logging_enabled: self.logging_enabled,
        }
    }
}

impl Default for ObservabilityEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}
