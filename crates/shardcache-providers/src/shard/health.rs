//! Shard liveness tracking for heartbeat failover

use shardcache_domain::constants::SHARD_DOWN_THRESHOLD;
use std::sync::atomic::{AtomicU32, Ordering};

/// Consecutive heartbeat failures of one shard
#[derive(Debug)]
pub struct ShardHealth {
    failures: AtomicU32,
    threshold: u32,
}

impl Default for ShardHealth {
    fn default() -> Self {
        Self::new(SHARD_DOWN_THRESHOLD)
    }
}

impl ShardHealth {
    /// Track a shard that goes down after `threshold` failures in a row
    pub fn new(threshold: u32) -> Self {
        Self {
            failures: AtomicU32::new(0),
            threshold: threshold.max(1),
        }
    }

    /// Record one heartbeat and return whether the shard belongs on the ring
    ///
    /// A single success brings a shard back.
    pub fn record(&self, healthy: bool) -> bool {
        if healthy {
            self.failures.store(0, Ordering::Relaxed);
            return true;
        }
        let failures = self
            .failures
            .fetch_add(1, Ordering::Relaxed)
            .saturating_add(1);
        failures < self.threshold
    }

    /// Current run of failed heartbeats
    pub fn failures(&self) -> u32 {
        self.failures.load(Ordering::Relaxed)
    }
}
