//! Tests for the in-memory shard client

use shardcache_domain::{Expiry, ShardClient};
use shardcache_providers::shard::MemoryShardClient;
use std::time::Duration;

#[tokio::test]
async fn test_get_missing_is_not_found() {
    let shard = MemoryShardClient::new();
    let err = shard.get("absent").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_set_get_del_exists() {
    let shard = MemoryShardClient::new();
    shard.set("k", b"v", Expiry::NONE).await.unwrap();

    assert_eq!(shard.get("k").await.unwrap(), b"v");
    assert_eq!(shard.exists("k").await.unwrap(), 1);
    assert_eq!(shard.del("k").await.unwrap(), 1);
    assert_eq!(shard.del("k").await.unwrap(), 0);
    assert_eq!(shard.exists("k").await.unwrap(), 0);
}

#[tokio::test]
async fn test_expired_entry_is_a_miss() {
    let shard = MemoryShardClient::new();
    shard
        .set("short", b"v", Expiry::from_millis(20))
        .await
        .unwrap();
    shard.set("long", b"v", Expiry::from_secs(60)).await.unwrap();

    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(shard.get("short").await.unwrap_err().is_not_found());
    assert_eq!(shard.exists("short").await.unwrap(), 0);
    assert_eq!(shard.get("long").await.unwrap(), b"v");
}

#[tokio::test]
async fn test_expired_entries_are_evicted_without_reads() {
    let shard = MemoryShardClient::new();
    let entries: Vec<_> = (0..100)
        .map(|i| (format!("short:{i}"), b"v".to_vec()))
        .collect();
    shard
        .pipeline_set(&entries, Expiry::from_millis(100))
        .await
        .unwrap();
    shard.set("long", b"v", Expiry::from_secs(60)).await.unwrap();
    assert_eq!(shard.len().await, 101);

    // Eviction runs on a coarse timer, so wait past a full tick
    tokio::time::sleep(Duration::from_millis(2500)).await;

    assert_eq!(shard.len().await, 1);
    assert_eq!(shard.get("long").await.unwrap(), b"v");
}

#[tokio::test]
async fn test_overwrite_replaces_lifetime() {
    let shard = MemoryShardClient::new();
    shard.set("k", b"old", Expiry::from_millis(50)).await.unwrap();
    shard.set("k", b"new", Expiry::NONE).await.unwrap();

    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(shard.get("k").await.unwrap(), b"new");
}

#[tokio::test]
async fn test_pipeline_preserves_key_order() {
    let shard = MemoryShardClient::new();
    let entries = vec![
        ("a".to_string(), b"1".to_vec()),
        ("c".to_string(), b"3".to_vec()),
    ];
    shard.pipeline_set(&entries, Expiry::NONE).await.unwrap();

    let keys = vec!["a".to_string(), "b".to_string(), "c".to_string()];
    let outcomes = shard.pipeline_get(&keys).await.unwrap();
    assert_eq!(outcomes.len(), 3);
    assert_eq!(outcomes[0].as_ref().unwrap(), b"1");
    assert!(outcomes[1].as_ref().unwrap_err().is_not_found());
    assert_eq!(outcomes[2].as_ref().unwrap(), b"3");
}

#[tokio::test]
async fn test_clear_and_ping() {
    let shard = MemoryShardClient::new();
    shard.set("k", b"v", Expiry::NONE).await.unwrap();
    assert!(!shard.is_empty().await);
    shard.clear().await;
    assert!(shard.is_empty().await);
    shard.ping().await.unwrap();
    assert_eq!(shard.provider_name(), "memory");
}
