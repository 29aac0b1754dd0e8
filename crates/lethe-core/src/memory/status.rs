use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle state derived from the decay score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleStatus {
    #[default]
    Active,
    Cold,
    Deprecated,
}

impl LifecycleStatus {
    pub const ALL: [LifecycleStatus; 3] = [Self::Active, Self::Cold, Self::Deprecated];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Cold => "cold",
            Self::Deprecated => "deprecated",
        }
    }
}

impl fmt::Display for LifecycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
