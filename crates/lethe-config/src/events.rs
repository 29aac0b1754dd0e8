use std::sync::Arc;

use lethe_core::config::{AlgorithmConfig, EngineConfig, FeatureToggles};
use lethe_core::errors::ConfigError;

/// An immutable config version. Shared by `Arc` with every reader.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigSnapshot {
    pub version: u64,
    pub config: EngineConfig,
}

impl ConfigSnapshot {
    pub fn algorithm(&self) -> &AlgorithmConfig {
        &self.config.algorithm_config
    }

    pub fn toggles(&self) -> &FeatureToggles {
        &self.config.feature_toggles
    }
}

/// Broadcast on every reload attempt.
#[derive(Debug, Clone)]
pub enum ConfigEvent {
    Reloaded {
        version: u64,
        previous: Arc<ConfigSnapshot>,
        current: Arc<ConfigSnapshot>,
        source: String,
    },
    ReloadFailed {
        error: ConfigError,
        source: String,
    },
}
