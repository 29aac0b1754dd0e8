//! Tracing setup: filter, format and destination chosen by
//! [`ObservabilityConfig`].

pub mod events;

use std::sync::Arc;

use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

use lethe_core::config::{LogTarget, ObservabilityConfig};
use lethe_core::errors::ConfigError;

use crate::writer::RotatingFileWriter;

/// Environment variable overriding `log_level`.
pub const LOG_ENV_VAR: &str = "LETHE_LOG";

/// Install the global subscriber.
///
/// `LETHE_LOG` wins over `config.log_level`. Returns `Ok(false)` when a
/// global subscriber was already installed.
pub fn init_tracing(config: &ObservabilityConfig) -> Result<bool, ConfigError> {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| ConfigError::Validation {
            field: "log_level".to_string(),
            reason: e.to_string(),
        })?;

    let writer = match config.log_target {
        LogTarget::Console => BoxMakeWriter::new(std::io::stderr),
        LogTarget::File => {
            let file = RotatingFileWriter::open(
                &config.log_file_path,
                config.max_file_bytes,
                config.max_generations,
            )
            .map_err(|e| ConfigError::Io {
                path: config.log_file_path.clone(),
                reason: e.to_string(),
            })?;
            BoxMakeWriter::new(Arc::new(file))
        }
    };
    let ansi = config.log_target == LogTarget::Console;

    let installed = if config.log_json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .with_target(true)
            .with_thread_ids(true)
            .json()
            .try_init()
            .is_ok()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .with_target(true)
            .with_ansi(ansi)
            .try_init()
            .is_ok()
    };
    Ok(installed)
}
