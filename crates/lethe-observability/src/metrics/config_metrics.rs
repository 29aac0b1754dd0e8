use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigMetrics {
    pub reloads_applied: u64,
    pub reloads_rejected: u64,
    pub current_version: u64,
}

impl ConfigMetrics {
    pub fn record_applied(&mut self, version: u64) {
        self.reloads_applied += 1;
        self.current_version = version;
    }

    pub fn record_rejected(&mut self) {
        self.reloads_rejected += 1;
    }
}
