use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Alert severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Warning,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertState {
    Active,
    Silenced,
}

/// A live threshold alert. At most one exists per metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceAlert {
    pub metric: String,
    pub severity: AlertSeverity,
    pub state: AlertState,
    /// Most recent observed value.
    pub value: f64,
    pub triggered_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub silenced_until: Option<DateTime<Utc>>,
    pub context: serde_json::Value,
}

impl PerformanceAlert {
    pub fn is_silenced_at(&self, now: DateTime<Utc>) -> bool {
        self.state == AlertState::Silenced && self.silenced_until.map_or(true, |until| now < until)
    }
}
