//! Config source parsing: flat or enveloped objects from JSON or TOML.
//!
//! Keys may be snake_case or camelCase; everything is normalized to
//! snake_case before deserialization so that merging a camelCase patch onto
//! a snake_case base never yields duplicate fields.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{AlgorithmConfig, FeatureToggles};
use crate::errors::ConfigError;

const ALGORITHM_KEY: &str = "algorithm_config";
const TOGGLES_KEY: &str = "feature_toggles";

/// The authoritative `(AlgorithmConfig, FeatureToggles)` pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub algorithm_config: AlgorithmConfig,
    pub feature_toggles: FeatureToggles,
}

impl EngineConfig {
    /// Build from a data object. A flat object is read as `AlgorithmConfig`
    /// fields; an object carrying `algorithm_config` or `feature_toggles`
    /// is read as an envelope. Missing fields take defaults. The result is
    /// validated.
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        let value = normalize_keys(value);
        let Value::Object(map) = value else {
            return Err(ConfigError::Parse {
                reason: "config source must be an object".to_string(),
            });
        };

        let config = if is_envelope(&map) {
            serde_json::from_value::<Self>(Value::Object(map)).map_err(parse_err)?
        } else {
            Self {
                algorithm_config: serde_json::from_value(Value::Object(map))
                    .map_err(parse_err)?,
                feature_toggles: FeatureToggles::default(),
            }
        };

        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let value: Value = serde_json::from_str(s).map_err(parse_err)?;
        Self::from_value(value)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Self::from_value(toml_to_json(s)?)
    }

    /// Load from a file; `.toml` files are parsed as TOML, everything else as JSON.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        Self::from_value(read_source(path)?)
    }

    /// Enveloped JSON form of this config.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Deep-merge a partial source onto this config and validate the result.
    /// A flat patch is applied to `algorithm_config`.
    pub fn merged(&self, patch: Value) -> Result<Self, ConfigError> {
        let patch = match normalize_keys(patch) {
            Value::Object(map) if is_envelope(&map) => Value::Object(map),
            Value::Object(map) => {
                let mut envelope = Map::new();
                envelope.insert(ALGORITHM_KEY.to_string(), Value::Object(map));
                Value::Object(envelope)
            }
            _ => {
                return Err(ConfigError::Parse {
                    reason: "config patch must be an object".to_string(),
                })
            }
        };
        let mut base = self.to_value();
        deep_merge(&mut base, patch);
        Self::from_value(base)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.algorithm_config.validate()
    }
}

/// Read a source file into a JSON value.
pub fn read_source(path: &Path) -> Result<Value, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let is_toml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("toml"));
    if is_toml {
        toml_to_json(&content)
    } else {
        serde_json::from_str(&content).map_err(parse_err)
    }
}

fn toml_to_json(s: &str) -> Result<Value, ConfigError> {
    let table: toml::Value = toml::from_str(s).map_err(|e| ConfigError::Parse {
        reason: e.to_string(),
    })?;
    serde_json::to_value(table).map_err(parse_err)
}

fn is_envelope(map: &Map<String, Value>) -> bool {
    map.contains_key(ALGORITHM_KEY) || map.contains_key(TOGGLES_KEY)
}

fn parse_err(e: serde_json::Error) -> ConfigError {
    ConfigError::Parse {
        reason: e.to_string(),
    }
}

/// Recursively merge `patch` into `base`. Objects merge key by key; any
/// other patch value replaces the base value.
pub fn deep_merge(base: &mut Value, patch: Value) {
    match (base, patch) {
        (Value::Object(base_map), Value::Object(patch_map)) => {
            for (key, value) in patch_map {
                match base_map.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, patch) => *base = patch,
    }
}

/// Convert every object key from camelCase to snake_case, recursively.
pub fn normalize_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (to_snake_case(&k), normalize_keys(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_keys).collect()),
        other => other,
    }
}

fn to_snake_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for (i, ch) in key.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}
