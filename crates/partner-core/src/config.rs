//! Router configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Router configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Refuse tables that are absent from the classification map instead
    /// of sending them to the hosted store
    #[serde(default)]
    pub strict_tables: bool,
    /// Seconds between background store health checks
    #[serde(default = "default_health_interval")]
    pub health_interval_secs: u64,
}

fn default_health_interval() -> u64 {
    30
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            strict_tables: false,
            health_interval_secs: default_health_interval(),
        }
    }
}

impl RouterConfig {
    pub fn health_interval(&self) -> Duration {
        Duration::from_secs(self.health_interval_secs.max(1))
    }
}
