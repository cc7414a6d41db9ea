//! Batch pipelining tests

use crate::common::CountingShardClient;
use serde::{Deserialize, Serialize};
use shardcache_application::{BatchExecutor, CacheClient};
use shardcache_domain::{Error, Expiry};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Point {
    x: i32,
    y: i32,
}

fn setup() -> (Arc<CountingShardClient>, CacheClient) {
    let shard = Arc::new(CountingShardClient::new());
    let client = CacheClient::new(shard.clone());
    (shard, client)
}

#[tokio::test]
async fn test_batch_get_empty_input_makes_no_calls() {
    let (shard, client) = setup();

    let err = client.batch_get(Vec::<String>::new()).await.unwrap_err();
    assert!(matches!(err, Error::EmptyInput { .. }));
    assert_eq!(shard.calls(), 0);
    assert_eq!(shard.pipeline_calls(), 0);
    assert_eq!(client.counters().requests, 0);
}

#[tokio::test]
async fn test_batch_set_empty_input_makes_no_calls() {
    let (shard, client) = setup();

    let entries: Vec<(String, Vec<u8>)> = Vec::new();
    let err = client.batch_set(entries, Expiry::NONE).await.unwrap_err();
    assert!(matches!(err, Error::EmptyInput { .. }));

    let err = client
        .batch_set_objects(Vec::<(String, Point)>::new(), Expiry::NONE)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::EmptyInput { .. }));
    assert_eq!(shard.calls(), 0);
}

#[tokio::test]
async fn test_batch_get_isolates_missing_key() {
    let (shard, client) = setup();
    shard.insert("A", b"a");
    shard.insert("C", b"c");

    let result = client.batch_get(["A", "B", "C"]).await.unwrap();
    assert_eq!(shard.pipeline_calls(), 1);
    assert_eq!(result.len(), 3);
    assert_eq!(result.get("A").unwrap().as_ref().unwrap(), b"a");
    assert_eq!(result.get("C").unwrap().as_ref().unwrap(), b"c");
    assert!(result.get("B").unwrap().as_ref().unwrap_err().is_not_found());

    let counters = client.counters();
    assert_eq!(counters.hits, 2);
    assert_eq!(counters.misses, 1);
    assert_eq!(counters.requests, 3);
}

#[tokio::test]
async fn test_batch_get_pipeline_failure_fails_whole_call() {
    let (shard, client) = setup();
    shard.set_fail_transport(true);

    let err = client.batch_get(["A", "B"]).await.unwrap_err();
    assert!(err.is_transport());
    assert_eq!(client.counters().misses, 2);
}

#[tokio::test]
async fn test_batch_get_collapses_duplicate_keys() {
    let (shard, client) = setup();
    shard.insert("A", b"a");

    let result = client.batch_get(["A", "A", "A"]).await.unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(client.counters().requests, 1);
}

#[tokio::test]
async fn test_batch_get_rejects_empty_key() {
    let (shard, client) = setup();

    let err = client.batch_get(["A", ""]).await.unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { .. }));
    assert_eq!(shard.calls(), 0);
}

#[tokio::test]
async fn test_batch_set_then_get_strings() {
    let (shard, client) = setup();

    let mut entries = HashMap::new();
    entries.insert("k1".to_string(), "v1".to_string());
    entries.insert("k2".to_string(), "v2".to_string());
    client.batch_set_strings(&entries, Expiry::NONE).await.unwrap();
    assert_eq!(shard.pipeline_calls(), 1);
    assert_eq!(client.counters().requests, 2);

    let values = client.batch_get_strings(["k1", "k2"]).await.unwrap();
    assert_eq!(values, entries);
}

#[tokio::test]
async fn test_batch_get_strings_aborts_on_first_bad_key() {
    let (shard, client) = setup();
    shard.insert("k1", b"v1");
    shard.insert("k3", b"v3");

    let err = client
        .batch_get_strings(["k1", "k2", "k3"])
        .await
        .unwrap_err();
    match err {
        Error::PartialBatchDecode { key, source } => {
            assert_eq!(key, "k2");
            assert!(source.is_not_found());
        }
        other => panic!("Expected PartialBatchDecode, got {other:?}"),
    }
}

#[tokio::test]
async fn test_batch_get_strings_reports_utf8_failure() {
    let (shard, client) = setup();
    shard.insert("k1", &[0xc3, 0x28]);

    let err = client.batch_get_strings(["k1"]).await.unwrap_err();
    match err {
        Error::PartialBatchDecode { key, source } => {
            assert_eq!(key, "k1");
            assert!(source.is_serialization());
        }
        other => panic!("Expected PartialBatchDecode, got {other:?}"),
    }
}

#[tokio::test]
async fn test_batch_objects_round_trip() {
    let (_shard, client) = setup();

    let entries = vec![
        ("p1".to_string(), Point { x: 1, y: 2 }),
        ("p2".to_string(), Point { x: 3, y: 4 }),
    ];
    client
        .batch_set_objects(entries.clone(), Expiry::from_secs(60))
        .await
        .unwrap();

    let points: HashMap<String, Point> = client.batch_get_objects(["p1", "p2"]).await.unwrap();
    assert_eq!(points.len(), 2);
    assert_eq!(points["p1"], entries[0].1);
    assert_eq!(points["p2"], entries[1].1);
}

#[tokio::test]
async fn test_batch_get_objects_aborts_on_decode_failure() {
    let (shard, client) = setup();
    shard.insert("p1", br#"{"x":1,"y":2}"#);
    shard.insert("p2", b"not a point");

    let err = client
        .batch_get_objects::<Point, _, _>(["p1", "p2"])
        .await
        .unwrap_err();
    match err {
        Error::PartialBatchDecode { key, source } => {
            assert_eq!(key, "p2");
            assert!(source.is_serialization());
        }
        other => panic!("Expected PartialBatchDecode, got {other:?}"),
    }
}

#[tokio::test]
async fn test_batch_set_pipeline_failure_is_single_error() {
    let (shard, client) = setup();
    shard.set_fail_transport(true);

    let err = client
        .batch_set([("k1", b"v1".as_slice()), ("k2", b"v2".as_slice())], Expiry::NONE)
        .await
        .unwrap_err();
    assert!(err.is_transport());
    assert!(shard.stored("k1").is_none());
}

#[test]
fn test_prepare_entries_keeps_last_value_for_repeated_key() {
    let entries = BatchExecutor::prepare_entries([("k", "first"), ("j", "x"), ("k", "second")])
        .unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0], ("k".to_string(), b"second".to_vec()));
    assert_eq!(entries[1].0, "j");
}

#[test]
fn test_prepare_keys_preserves_first_seen_order() {
    let keys = BatchExecutor::prepare_keys(["b", "a", "b", "c"]).unwrap();
    assert_eq!(keys, vec!["b", "a", "c"]);
}
