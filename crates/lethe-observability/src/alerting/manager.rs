//! Alert lifecycle: triggered → updated → recovered, with silencing that is
//! independent of value changes.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use lethe_core::config::{AlertRuleConfig, Breach};
use lethe_core::models::{AlertSeverity, AlertState, PerformanceAlert};

use super::sinks::AlertSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertEventKind {
    Triggered,
    /// Severity changed while the alert stayed live.
    Updated,
    Recovered,
    Silenced,
    Unsilenced,
}

/// What sinks receive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
    pub kind: AlertEventKind,
    pub alert: PerformanceAlert,
}

pub struct AlertManager {
    rules: Vec<AlertRuleConfig>,
    alerts: BTreeMap<String, PerformanceAlert>,
    sinks: Vec<Box<dyn AlertSink>>,
    enabled: bool,
}

impl std::fmt::Debug for AlertManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlertManager")
            .field("rules", &self.rules)
            .field("alerts", &self.alerts)
            .field("sinks", &self.sinks.iter().map(|s| s.name()).collect::<Vec<_>>())
            .field("enabled", &self.enabled)
            .finish()
    }
}

impl AlertManager {
    pub fn new(rules: Vec<AlertRuleConfig>) -> Self {
        Self {
            rules,
            alerts: BTreeMap::new(),
            sinks: Vec::new(),
            enabled: true,
        }
    }

    pub fn add_sink(&mut self, sink: Box<dyn AlertSink>) {
        self.sinks.push(sink);
    }

    /// When disabled, `evaluate` is a no-op. Live alerts are kept.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn rules(&self) -> &[AlertRuleConfig] {
        &self.rules
    }

    /// Check `value` against the rule for `metric` and advance that metric's
    /// alert. Returns the lifecycle event, if any. Metrics without a rule
    /// are ignored.
    pub fn evaluate(
        &mut self,
        metric: &str,
        value: f64,
        context: serde_json::Value,
        now: DateTime<Utc>,
    ) -> Option<AlertEvent> {
        if !self.enabled {
            return None;
        }
        let rule = self.rules.iter().find(|r| r.metric == metric)?;
        let severity = severity_for(rule, value);

        let expired = self.expire_silence(metric, now);

        let live = self.alerts.contains_key(metric);
        let event = match (live, severity) {
            (false, None) => None,
            (false, Some(severity)) => {
                let alert = PerformanceAlert {
                    metric: metric.to_string(),
                    severity,
                    state: AlertState::Active,
                    value,
                    triggered_at: now,
                    updated_at: now,
                    silenced_until: None,
                    context,
                };
                self.alerts.insert(metric.to_string(), alert.clone());
                Some(AlertEvent {
                    kind: AlertEventKind::Triggered,
                    alert,
                })
            }
            (true, Some(severity)) => self.alerts.get_mut(metric).and_then(|alert| {
                let changed = alert.severity != severity;
                alert.value = value;
                alert.severity = severity;
                alert.context = context;
                alert.updated_at = now;
                changed.then(|| AlertEvent {
                    kind: AlertEventKind::Updated,
                    alert: alert.clone(),
                })
            }),
            (true, None) => self.alerts.remove(metric).map(|mut alert| {
                alert.value = value;
                alert.updated_at = now;
                AlertEvent {
                    kind: AlertEventKind::Recovered,
                    alert,
                }
            }),
        };

        if let Some(unsilenced) = expired {
            self.notify(&unsilenced, now);
        }
        if let Some(event) = &event {
            self.notify(event, now);
        }
        event
    }

    /// Silence the live alert for `metric` until `until` (or indefinitely).
    /// Returns false when no alert is live.
    pub fn silence(&mut self, metric: &str, until: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        let Some(alert) = self.alerts.get_mut(metric) else {
            return false;
        };
        alert.state = AlertState::Silenced;
        alert.silenced_until = until;
        alert.updated_at = now;
        let event = AlertEvent {
            kind: AlertEventKind::Silenced,
            alert: alert.clone(),
        };
        self.deliver(&event);
        true
    }

    pub fn unsilence(&mut self, metric: &str, now: DateTime<Utc>) -> bool {
        let Some(alert) = self.alerts.get_mut(metric) else {
            return false;
        };
        if alert.state != AlertState::Silenced {
            return false;
        }
        alert.state = AlertState::Active;
        alert.silenced_until = None;
        alert.updated_at = now;
        let event = AlertEvent {
            kind: AlertEventKind::Unsilenced,
            alert: alert.clone(),
        };
        self.deliver(&event);
        true
    }

    pub fn get(&self, metric: &str) -> Option<&PerformanceAlert> {
        self.alerts.get(metric)
    }

    /// Every live alert, silenced ones included.
    pub fn live_alerts(&self) -> Vec<PerformanceAlert> {
        self.alerts.values().cloned().collect()
    }

    /// Lift a silence whose deadline has passed.
    fn expire_silence(&mut self, metric: &str, now: DateTime<Utc>) -> Option<AlertEvent> {
        let alert = self.alerts.get_mut(metric)?;
        if alert.state != AlertState::Silenced || alert.is_silenced_at(now) {
            return None;
        }
        alert.state = AlertState::Active;
        alert.silenced_until = None;
        alert.updated_at = now;
        Some(AlertEvent {
            kind: AlertEventKind::Unsilenced,
            alert: alert.clone(),
        })
    }

    /// Deliver unless the alert is silenced. Recovery is always delivered.
    fn notify(&self, event: &AlertEvent, now: DateTime<Utc>) {
        if event.kind != AlertEventKind::Recovered && event.alert.is_silenced_at(now) {
            return;
        }
        self.deliver(event);
    }

    fn deliver(&self, event: &AlertEvent) {
        for sink in &self.sinks {
            if let Err(e) = sink.deliver(event) {
                tracing::debug!(sink = sink.name(), error = %e, "alert sink failed");
            }
        }
    }
}

fn severity_for(rule: &AlertRuleConfig, value: f64) -> Option<AlertSeverity> {
    let breaches = |threshold: f64| match rule.breach {
        Breach::Above => value >= threshold,
        Breach::Below => value <= threshold,
    };
    if breaches(rule.critical) {
        Some(AlertSeverity::Critical)
    } else if breaches(rule.warning) {
        Some(AlertSeverity::Warning)
    } else {
        None
    }
}
