//! Configuration types, defaults, validation, and source parsing.

pub mod algorithm_config;
pub mod defaults;
pub mod feature_toggles;
pub mod observability_config;
pub mod source;

pub use algorithm_config::{
    AlgorithmConfig, BatchSettings, SchedulerSettings, StructureBoostConfig, Thresholds,
    TimeDecayConfig, UsageBoostConfig,
};
pub use feature_toggles::FeatureToggles;
pub use observability_config::{
    default_rules, AlertRuleConfig, AlertSinkKind, Breach, LogTarget, ObservabilityConfig,
};
pub use source::{deep_merge, normalize_keys, EngineConfig};
