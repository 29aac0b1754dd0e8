use serde::{Deserialize, Serialize};

/// Independent switches gating each subsystem. All on by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureToggles {
    /// Recompute scores. When off, the decay pass leaves scores untouched.
    pub algorithm: bool,
    /// Run scheduled decay ticks.
    pub scheduler: bool,
    /// Reclassify lifecycle status.
    pub classification: bool,
    /// Evaluate alert rules and notify sinks.
    pub alerting: bool,
    /// Emit structured decay events.
    pub logging: bool,
}

impl Default for FeatureToggles {
    fn default() -> Self {
        Self {
            algorithm: true,
            scheduler: true,
            classification: true,
            alerting: true,
            logging: true,
        }
    }
}
