use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::LifecycleStatus;
use crate::errors::LetheResult;

/// A partial meta object. Shallow-merged onto the stored meta; patch keys win.
pub type MetaPatch = Map<String, Value>;

/// Per-record decay metadata, stored as a JSON object.
///
/// Keys this crate does not know about are kept in `extra` and written back
/// untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryMeta {
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub access_count: u64,
    #[serde(default)]
    pub in_degree: u64,
    #[serde(default)]
    pub out_degree: u64,
    /// `None` when the record has never been accessed.
    #[serde(default)]
    pub last_accessed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: LifecycleStatus,
    #[serde(default)]
    pub version: u64,
    /// Mean weight of this record's links, when the link graph provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_link_weight: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for MemoryMeta {
    fn default() -> Self {
        Self {
            score: 0.0,
            access_count: 0,
            in_degree: 0,
            out_degree: 0,
            last_accessed_at: None,
            status: LifecycleStatus::Active,
            version: 0,
            avg_link_weight: None,
            extra: Map::new(),
        }
    }
}

impl MemoryMeta {
    /// Structural degree: inbound plus outbound links.
    pub fn degree(&self) -> u64 {
        self.in_degree.saturating_add(self.out_degree)
    }

    /// Shallow-merge `patch` onto this meta. Patch keys replace existing keys.
    pub fn merged(&self, patch: &MetaPatch) -> LetheResult<Self> {
        let mut value = serde_json::to_value(self)?;
        if let Value::Object(map) = &mut value {
            for (key, v) in patch {
                map.insert(key.clone(), v.clone());
            }
        }
        Ok(serde_json::from_value(value)?)
    }

    pub fn to_json(&self) -> LetheResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}
