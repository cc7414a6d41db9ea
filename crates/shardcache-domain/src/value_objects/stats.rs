//! Stats window values
//!
//! [`StatsReport`] is the externally observable artifact of a stats window;
//! its JSON form uses camelCase field names.

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Derived metrics for one stats window
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsReport {
    /// Window start, nanoseconds since the Unix epoch
    pub start_time: i64,
    /// Window end, nanoseconds since the Unix epoch
    pub end_time: i64,
    /// Hits as a percentage of hits plus misses (0-100)
    pub hit_ratio: f64,
    /// Mean latency per request in milliseconds
    pub mean_latency_millis: f64,
    /// Requests per second over the window
    pub queries_per_second: i64,
}

impl StatsReport {
    /// A report with only the window bounds set
    pub fn empty(start_time: i64, end_time: i64) -> Self {
        Self {
            start_time,
            end_time,
            ..Self::default()
        }
    }

    /// True when every derived field is zero
    pub fn is_empty(&self) -> bool {
        self.hit_ratio == 0.0 && self.mean_latency_millis == 0.0 && self.queries_per_second == 0
    }

    /// Serialize the report as JSON text
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a report from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Raw counter values of a stats window at one instant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsCounters {
    /// Successful gets
    pub hits: u64,
    /// Failed gets, including not-found
    pub misses: u64,
    /// Every recorded operation
    pub requests: i64,
    /// Cumulative operation latency in nanoseconds
    pub latency_nanos: i64,
    /// Window start, nanoseconds since the Unix epoch
    pub window_start_nanos: i64,
}
