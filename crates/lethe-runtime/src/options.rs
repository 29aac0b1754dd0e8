use std::path::PathBuf;
use std::time::Duration;

use lethe_core::config::{defaults, EngineConfig, ObservabilityConfig};
use lethe_core::models::LockRetryConfig;
use lethe_observability::AlertCallback;

/// Options for building a [`LetheRuntime`](crate::LetheRuntime).
#[derive(Default)]
pub struct RuntimeOptions {
    /// Path to the SQLite database. If None, uses in-memory.
    pub db_path: Option<PathBuf>,
    /// Initial engine config. Ignored when `config_path` is set.
    pub engine_config: EngineConfig,
    /// JSON or TOML file to load the engine config from.
    pub config_path: Option<PathBuf>,
    /// Reload `config_path` on change once the runtime is started.
    pub watch_config: bool,
    /// Defaults to `DEFAULT_RELOAD_DEBOUNCE_MS` when None.
    pub reload_debounce: Option<Duration>,
    pub observability: ObservabilityConfig,
    /// Receives alert events when `observability.alert_sinks` lists `callback`.
    pub alert_callback: Option<AlertCallback>,
    pub lock_retry: LockRetryConfig,
    /// Install the global tracing subscriber from `observability`.
    pub init_tracing: bool,
}

impl RuntimeOptions {
    pub fn in_memory(engine_config: EngineConfig) -> Self {
        Self {
            engine_config,
            ..Default::default()
        }
    }

    pub(crate) fn debounce(&self) -> Duration {
        self.reload_debounce
            .unwrap_or(Duration::from_millis(defaults::DEFAULT_RELOAD_DEBOUNCE_MS))
    }
}
