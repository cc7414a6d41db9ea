//! shardcache - Sample Driver Entry Point
//!
//! Loads configuration, builds the configured cache client and drives it
//! with random traffic, logging a stats report every `stats.interval_secs`.
//! Stops after `--iterations` rounds or on Ctrl-C.

use anyhow::Context;
use clap::Parser;
use shardcache::driver::{
    DEFAULT_KEY_SPACE, DEFAULT_OPS_PER_ROUND, DEFAULT_PAUSE_MILLIS, DriverOptions, run_driver,
};
use shardcache::infrastructure::logging::{init_logging, log_config_loaded};
use shardcache::infrastructure::{ConfigLoader, build_cache_client};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// Command line interface for the shardcache driver
#[derive(Parser, Debug)]
#[command(name = "shardcache")]
#[command(about = "shardcache - instrumented sharded cache client driver")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Rounds to run before exiting; runs until Ctrl-C when omitted
    #[arg(short, long)]
    pub iterations: Option<u64>,

    /// Sets and gets per round
    #[arg(long, default_value_t = DEFAULT_OPS_PER_ROUND)]
    pub ops_per_round: usize,

    /// Size of the random key and value space
    #[arg(long, default_value_t = DEFAULT_KEY_SPACE)]
    pub key_space: u32,

    /// Pause between rounds in milliseconds
    #[arg(long, default_value_t = DEFAULT_PAUSE_MILLIS)]
    pub pause_ms: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut loader = ConfigLoader::new();
    if let Some(path) = &cli.config {
        loader = loader.with_config_path(path);
    }
    let config = loader.load().context("failed to load configuration")?;
    init_logging(&config.logging).context("failed to initialize logging")?;
    // Lines logged while loading predate the subscriber
    match loader.resolved_config_path() {
        Some(path) => log_config_loaded(&path, true),
        None => info!("no configuration file found, using defaults and environment"),
    }

    let client = build_cache_client(&config)
        .await
        .context("failed to build cache client")?;

    let options = DriverOptions {
        ops_per_round: cli.ops_per_round,
        key_space: cli.key_space,
        pause: Duration::from_millis(cli.pause_ms),
        stats_interval: config.stats.interval(),
        rounds: cli.iterations,
    };
    info!(provider = %config.provider, ?options, "driver starting");

    let outcome = tokio::select! {
        result = run_driver(&client, &options) => Some(result),
        _ = tokio::signal::ctrl_c() => None,
    };

    let final_report = client.stats_json().context("failed to encode final stats")?;
    info!(stats = %final_report, "final cache stats");
    client.shutdown();

    match outcome {
        Some(result) => {
            let summary = result.context("driver failed")?;
            info!(rounds = summary.rounds, reports = summary.reports.len(), "driver finished");
        }
        None => info!("driver interrupted"),
    }
    Ok(())
}
