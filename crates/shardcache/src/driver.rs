//! Sample load driver
//!
//! Runs rounds of random string sets and gets against a [`CacheClient`],
//! pausing between rounds and logging the stats report whenever the stats
//! interval has elapsed. Individual operation failures are expected (most
//! gets miss) and are left to the client's own logging.

use rand::Rng;
use shardcache_application::CacheClient;
use shardcache_domain::error::Result;
use shardcache_domain::value_objects::{Expiry, StatsReport};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Default operations of each kind per round
pub const DEFAULT_OPS_PER_ROUND: usize = 100;

/// Default number of distinct keys and values
pub const DEFAULT_KEY_SPACE: u32 = 1000;

/// Default pause between rounds in milliseconds
pub const DEFAULT_PAUSE_MILLIS: u64 = 1000;

/// Driver settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverOptions {
    /// Sets and gets issued per round
    pub ops_per_round: usize,
    /// Keys and values are drawn from `0..key_space`
    pub key_space: u32,
    /// Pause after each round
    pub pause: Duration,
    /// Minimum time between stats reports
    pub stats_interval: Duration,
    /// Stop after this many rounds; `None` runs until cancelled
    pub rounds: Option<u64>,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            ops_per_round: DEFAULT_OPS_PER_ROUND,
            key_space: DEFAULT_KEY_SPACE,
            pause: Duration::from_millis(DEFAULT_PAUSE_MILLIS),
            stats_interval: Duration::from_secs(10),
            rounds: None,
        }
    }
}

/// What a finished driver run did
#[derive(Debug, Clone, Default)]
pub struct DriverSummary {
    /// Rounds completed
    pub rounds: u64,
    /// Reports emitted, oldest first
    pub reports: Vec<StatsReport>,
}

fn random_token(space: u32) -> String {
    rand::rng().random_range(0..space.max(1)).to_string()
}

/// Run rounds until `options.rounds` is reached
pub async fn run_driver(client: &CacheClient, options: &DriverOptions) -> Result<DriverSummary> {
    let mut summary = DriverSummary::default();
    let mut last_report = Instant::now();

    while options.rounds.is_none_or(|limit| summary.rounds < limit) {
        for _ in 0..options.ops_per_round {
            let key = random_token(options.key_space);
            let value = random_token(options.key_space);
            let _ = client.set_string(&key, &value, Expiry::NONE).await;

            let key = random_token(options.key_space);
            let _ = client.get_string(&key).await;
        }
        summary.rounds += 1;
        debug!(round = summary.rounds, "driver: round complete");

        if !options.pause.is_zero() {
            tokio::time::sleep(options.pause).await;
        }

        if last_report.elapsed() >= options.stats_interval {
            last_report = Instant::now();
            let report = client.stats();
            info!(stats = %report.to_json()?, "cache stats");
            summary.reports.push(report);
        }
    }

    Ok(summary)
}
