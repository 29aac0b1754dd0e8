use serde::{Deserialize, Serialize};

use super::defaults;
use crate::errors::ConfigError;

/// Where structured logs are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogTarget {
    Console,
    File,
}

/// Alert delivery targets. `Callback` is only active when the embedding
/// application supplies a callback at runtime construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSinkKind {
    Console,
    File,
    Callback,
}

/// Direction in which a metric value breaches its thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Breach {
    Above,
    Below,
}

/// Threshold rule for one metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRuleConfig {
    pub metric: String,
    pub warning: f64,
    pub critical: f64,
    #[serde(default = "default_breach")]
    pub breach: Breach,
}

fn default_breach() -> Breach {
    Breach::Above
}

/// Logging and alerting configuration. Read once at runtime construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Filter directive: "trace", "debug", "info", "warn", "error", or an EnvFilter string.
    pub log_level: String,
    pub log_target: LogTarget,
    pub log_json: bool,
    pub log_file_path: String,
    /// Size at which a log or alert file is rotated.
    pub max_file_bytes: u64,
    /// Rotated generations kept besides the live file.
    pub max_generations: usize,
    pub alert_sinks: Vec<AlertSinkKind>,
    pub alert_file_path: String,
    pub rules: Vec<AlertRuleConfig>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: defaults::DEFAULT_LOG_LEVEL.to_string(),
            log_target: LogTarget::Console,
            log_json: false,
            log_file_path: defaults::DEFAULT_LOG_FILE.to_string(),
            max_file_bytes: defaults::DEFAULT_MAX_FILE_BYTES,
            max_generations: defaults::DEFAULT_MAX_GENERATIONS,
            alert_sinks: vec![AlertSinkKind::Console],
            alert_file_path: defaults::DEFAULT_ALERT_FILE.to_string(),
            rules: default_rules(),
        }
    }
}

/// Rules installed when none are configured.
pub fn default_rules() -> Vec<AlertRuleConfig> {
    vec![
        AlertRuleConfig {
            metric: "failed_batches".to_string(),
            warning: 1.0,
            critical: 5.0,
            breach: Breach::Above,
        },
        AlertRuleConfig {
            metric: "lock_conflict_rate".to_string(),
            warning: 0.1,
            critical: 0.5,
            breach: Breach::Above,
        },
        AlertRuleConfig {
            metric: "pass_duration_ms".to_string(),
            warning: 60_000.0,
            critical: 300_000.0,
            breach: Breach::Above,
        },
    ]
}

impl ObservabilityConfig {
    /// Parse from a TOML string. Missing fields fall back to defaults.
    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_file_bytes == 0 {
            return Err(ConfigError::invalid("max_file_bytes", "must be > 0"));
        }
        for rule in &self.rules {
            if !rule.warning.is_finite() || !rule.critical.is_finite() {
                return Err(ConfigError::invalid(
                    &format!("rules.{}", rule.metric),
                    "thresholds must be finite",
                ));
            }
            let ordered = match rule.breach {
                Breach::Above => rule.warning <= rule.critical,
                Breach::Below => rule.warning >= rule.critical,
            };
            if !ordered {
                return Err(ConfigError::invalid(
                    &format!("rules.{}", rule.metric),
                    "critical threshold must be at least as severe as warning",
                ));
            }
        }
        Ok(())
    }
}
