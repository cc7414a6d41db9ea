//! Stats reporting configuration

use crate::constants::DEFAULT_STATS_INTERVAL_SECS;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How often a driver closes the stats window and reports it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    /// Seconds between stats reports
    pub interval_secs: u64,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_STATS_INTERVAL_SECS,
        }
    }
}

impl StatsConfig {
    /// Report interval
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}
