//! Sample driver tests

use shardcache::CacheClient;
use shardcache::driver::{DriverOptions, run_driver};
use shardcache::providers::shard::MemoryShardClient;
use std::sync::Arc;
use std::time::Duration;

fn memory_client() -> CacheClient {
    CacheClient::new(Arc::new(MemoryShardClient::new()))
}

fn quick_options(rounds: u64) -> DriverOptions {
    DriverOptions {
        ops_per_round: 50,
        key_space: 10,
        pause: Duration::ZERO,
        stats_interval: Duration::from_secs(3600),
        rounds: Some(rounds),
    }
}

#[tokio::test]
async fn test_driver_runs_requested_rounds() {
    let client = memory_client();
    let summary = run_driver(&client, &quick_options(3)).await.unwrap();

    assert_eq!(summary.rounds, 3);
    assert!(summary.reports.is_empty());

    let counters = client.counters();
    // One set and one get per op
    assert_eq!(counters.requests, 300);
    assert_eq!(counters.hits + counters.misses, 150);
}

#[tokio::test]
async fn test_driver_zero_rounds_does_nothing() {
    let client = memory_client();
    let summary = run_driver(&client, &quick_options(0)).await.unwrap();

    assert_eq!(summary.rounds, 0);
    assert_eq!(client.counters().requests, 0);
}

#[tokio::test]
async fn test_driver_reports_every_interval() {
    let client = memory_client();
    let options = DriverOptions {
        pause: Duration::from_millis(5),
        stats_interval: Duration::ZERO,
        ..quick_options(2)
    };
    let summary = run_driver(&client, &options).await.unwrap();

    assert_eq!(summary.reports.len(), 2);
    let last = summary.reports.last().unwrap();
    assert!(last.queries_per_second > 0);
    assert!((0.0..=100.0).contains(&last.hit_ratio));
}

#[tokio::test]
async fn test_small_key_space_eventually_hits() {
    let client = memory_client();
    let options = DriverOptions {
        key_space: 1,
        ..quick_options(1)
    };
    run_driver(&client, &options).await.unwrap();

    // A single key is always set before the matching get
    let counters = client.counters();
    assert_eq!(counters.hits, 50);
    assert_eq!(counters.misses, 0);
}
