use serde::{Deserialize, Serialize};

use super::defaults;
use crate::errors::ConfigError;

/// Score formula, classification, and scheduling parameters.
///
/// Replaced as a whole on reload. Call [`AlgorithmConfig::validate`] before
/// trusting a candidate built from external input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlgorithmConfig {
    pub min_score: f64,
    pub max_score: f64,
    pub thresholds: Thresholds,
    pub time_decay: TimeDecayConfig,
    pub usage_boost: UsageBoostConfig,
    pub structure_boost: StructureBoostConfig,
    pub scheduler: SchedulerSettings,
    pub batch: BatchSettings,
}

/// Lifecycle classification thresholds. `cold_min_score <= active_min_score`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub active_min_score: f64,
    pub cold_min_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeDecayConfig {
    /// Asymptotic floor of the decay factor. Effective floor is constrained to [0.95, 1.0].
    pub min_factor: f64,
    /// Upper clamp of the decay factor.
    pub max_factor: f64,
    /// Time constant of the exponential approach to the floor, in hours.
    pub full_decay_hours: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UsageBoostConfig {
    pub max_boost: f64,
    /// Access counts above this value no longer add to the boost.
    pub saturation_access_count: u64,
    /// Recency window over which access counts are discounted, in hours.
    pub window_hours: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructureBoostConfig {
    pub max_boost: f64,
    /// Link degrees above this value no longer add to the boost.
    pub saturation_link_count: u64,
    pub min_link_weight: f64,
    pub max_link_weight: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerSettings {
    pub interval_ms: u64,
    pub batch_size: usize,
}

/// Retry, timeout, and throttling knobs for the batch processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchSettings {
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub transaction_timeout_ms: u64,
    pub inter_batch_delay_ms: u64,
}

impl Default for AlgorithmConfig {
    fn default() -> Self {
        Self {
            min_score: defaults::DEFAULT_MIN_SCORE,
            max_score: defaults::DEFAULT_MAX_SCORE,
            thresholds: Thresholds::default(),
            time_decay: TimeDecayConfig::default(),
            usage_boost: UsageBoostConfig::default(),
            structure_boost: StructureBoostConfig::default(),
            scheduler: SchedulerSettings::default(),
            batch: BatchSettings::default(),
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            active_min_score: defaults::DEFAULT_ACTIVE_MIN_SCORE,
            cold_min_score: defaults::DEFAULT_COLD_MIN_SCORE,
        }
    }
}

impl Default for TimeDecayConfig {
    fn default() -> Self {
        Self {
            min_factor: defaults::DEFAULT_TIME_DECAY_MIN_FACTOR,
            max_factor: defaults::DEFAULT_TIME_DECAY_MAX_FACTOR,
            full_decay_hours: defaults::DEFAULT_FULL_DECAY_HOURS,
        }
    }
}

impl Default for UsageBoostConfig {
    fn default() -> Self {
        Self {
            max_boost: defaults::DEFAULT_USAGE_MAX_BOOST,
            saturation_access_count: defaults::DEFAULT_USAGE_SATURATION_ACCESS_COUNT,
            window_hours: defaults::DEFAULT_USAGE_WINDOW_HOURS,
        }
    }
}

impl Default for StructureBoostConfig {
    fn default() -> Self {
        Self {
            max_boost: defaults::DEFAULT_STRUCTURE_MAX_BOOST,
            saturation_link_count: defaults::DEFAULT_STRUCTURE_SATURATION_LINK_COUNT,
            min_link_weight: defaults::DEFAULT_MIN_LINK_WEIGHT,
            max_link_weight: defaults::DEFAULT_MAX_LINK_WEIGHT,
        }
    }
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            interval_ms: defaults::DEFAULT_DECAY_INTERVAL_MS,
            batch_size: defaults::DEFAULT_BATCH_SIZE,
        }
    }
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            max_retries: defaults::DEFAULT_BATCH_MAX_RETRIES,
            retry_backoff_ms: defaults::DEFAULT_RETRY_BACKOFF_MS,
            max_backoff_ms: defaults::DEFAULT_MAX_BACKOFF_MS,
            transaction_timeout_ms: defaults::DEFAULT_TRANSACTION_TIMEOUT_MS,
            inter_batch_delay_ms: defaults::DEFAULT_INTER_BATCH_DELAY_MS,
        }
    }
}

impl AlgorithmConfig {
    /// Check every invariant. Returns the first violation found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        finite("min_score", self.min_score)?;
        finite("max_score", self.max_score)?;
        if self.min_score > self.max_score {
            return Err(ConfigError::invalid(
                "min_score",
                format!("{} exceeds max_score {}", self.min_score, self.max_score),
            ));
        }

        let t = &self.thresholds;
        finite("thresholds.active_min_score", t.active_min_score)?;
        finite("thresholds.cold_min_score", t.cold_min_score)?;
        if t.cold_min_score > t.active_min_score {
            return Err(ConfigError::invalid(
                "thresholds.cold_min_score",
                format!(
                    "{} exceeds active_min_score {}",
                    t.cold_min_score, t.active_min_score
                ),
            ));
        }

        let td = &self.time_decay;
        finite("time_decay.min_factor", td.min_factor)?;
        finite("time_decay.max_factor", td.max_factor)?;
        if !(0.0..=1.0).contains(&td.min_factor)
            || !(0.0..=1.0).contains(&td.max_factor)
            || td.min_factor > td.max_factor
        {
            return Err(ConfigError::invalid(
                "time_decay",
                format!(
                    "requires 0 <= min_factor ({}) <= max_factor ({}) <= 1",
                    td.min_factor, td.max_factor
                ),
            ));
        }
        positive("time_decay.full_decay_hours", td.full_decay_hours)?;

        non_negative("usage_boost.max_boost", self.usage_boost.max_boost)?;
        positive("usage_boost.window_hours", self.usage_boost.window_hours)?;

        let sb = &self.structure_boost;
        non_negative("structure_boost.max_boost", sb.max_boost)?;
        non_negative("structure_boost.min_link_weight", sb.min_link_weight)?;
        finite("structure_boost.max_link_weight", sb.max_link_weight)?;
        if sb.min_link_weight > sb.max_link_weight {
            return Err(ConfigError::invalid(
                "structure_boost.min_link_weight",
                format!(
                    "{} exceeds max_link_weight {}",
                    sb.min_link_weight, sb.max_link_weight
                ),
            ));
        }

        if self.scheduler.interval_ms == 0 {
            return Err(ConfigError::invalid("scheduler.interval_ms", "must be > 0"));
        }
        if self.scheduler.batch_size == 0 {
            return Err(ConfigError::invalid("scheduler.batch_size", "must be > 0"));
        }
        if self.batch.transaction_timeout_ms == 0 {
            return Err(ConfigError::invalid(
                "batch.transaction_timeout_ms",
                "must be > 0",
            ));
        }

        Ok(())
    }
}

fn finite(field: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("must be finite, got {value}")))
    }
}

fn non_negative(field: &str, value: f64) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value < 0.0 {
        return Err(ConfigError::invalid(field, format!("must be >= 0, got {value}")));
    }
    Ok(())
}

fn positive(field: &str, value: f64) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value <= 0.0 {
        return Err(ConfigError::invalid(field, format!("must be > 0, got {value}")));
    }
    Ok(())
}
