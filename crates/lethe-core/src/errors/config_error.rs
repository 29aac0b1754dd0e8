/// Configuration loading and validation errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid config: {field} {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to parse config: {reason}")]
    Parse { reason: String },

    #[error("failed to read config file {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("config reload queue is closed")]
    ReloadQueueClosed,
}

impl ConfigError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}
