//! Cache client facade tests

use crate::common::CountingShardClient;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use shardcache_application::{CacheClient, JsonSerializer, ManualClock, Serializer};
use shardcache_domain::{Error, Expiry};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Object {
    #[serde(rename = "Str")]
    text: String,
    #[serde(rename = "Num")]
    num: i64,
}

fn client_with(shard: Arc<CountingShardClient>) -> (Arc<ManualClock>, CacheClient) {
    let clock = Arc::new(ManualClock::new(0));
    let client = CacheClient::new(shard).with_clock(clock.clone());
    (clock, client)
}

#[tokio::test]
async fn test_get_missing_keys_count_as_misses() {
    let shard = Arc::new(CountingShardClient::new());
    let (clock, client) = client_with(shard);

    for i in 0..5 {
        let err = client.get(&format!("absent{i}")).await.unwrap_err();
        assert!(err.is_not_found());
    }
    let counters = client.counters();
    assert_eq!(counters.misses, 5);
    assert_eq!(counters.hits, 0);
    assert_eq!(counters.requests, 5);

    clock.advance(Duration::from_secs(1));
    assert_eq!(client.stats().hit_ratio, 0.0);
}

#[tokio::test]
async fn test_hits_and_misses_mix() {
    let shard = Arc::new(CountingShardClient::new());
    shard.insert("key1", b"v1");
    let (clock, client) = client_with(shard);

    for _ in 0..3 {
        assert_eq!(client.get("key1").await.unwrap(), b"v1");
    }
    assert!(client.get("key11").await.is_err());

    clock.advance(Duration::from_secs(1));
    let report = client.stats();
    assert_eq!(report.hit_ratio, 75.0);
    assert_eq!(report.queries_per_second, 4);
}

#[tokio::test]
async fn test_set_counts_request_but_not_hit_or_miss() {
    let shard = Arc::new(CountingShardClient::new());
    let (_clock, client) = client_with(shard.clone());

    client.set("key1", b"v1", Expiry::NONE).await.unwrap();
    client
        .set_string("key2", "v2", Duration::from_secs(30))
        .await
        .unwrap();

    let counters = client.counters();
    assert_eq!(counters.requests, 2);
    assert_eq!(counters.hits, 0);
    assert_eq!(counters.misses, 0);
    assert_eq!(shard.stored("key2").unwrap(), b"v2");
}

#[tokio::test]
async fn test_set_error_is_returned_and_counted() {
    let shard = Arc::new(CountingShardClient::new());
    shard.set_fail_transport(true);
    let (_clock, client) = client_with(shard);

    let err = client.set("key1", b"v1", Expiry::NONE).await.unwrap_err();
    assert!(err.is_transport());
    assert_eq!(client.counters().requests, 1);
}

#[tokio::test]
async fn test_get_transport_error_is_a_miss() {
    let shard = Arc::new(CountingShardClient::new());
    shard.set_fail_transport(true);
    let (_clock, client) = client_with(shard);

    let err = client.get("key1").await.unwrap_err();
    assert!(err.is_transport());
    assert_eq!(client.counters().misses, 1);
}

#[tokio::test]
async fn test_string_round_trip() {
    let shard = Arc::new(CountingShardClient::new());
    let (_clock, client) = client_with(shard.clone());

    client.set_string("key1", "v1", Expiry::NONE).await.unwrap();
    assert_eq!(client.get_string("key1").await.unwrap(), "v1");

    shard.insert("binary", &[0xff, 0xfe]);
    let err = client.get_string("binary").await.unwrap_err();
    assert!(err.is_serialization());
}

#[tokio::test]
async fn test_object_round_trip() {
    let shard = Arc::new(CountingShardClient::new());
    let (_clock, client) = client_with(shard.clone());

    let input = Object {
        text: "test".to_string(),
        num: 1,
    };
    client.set_object("object", &input, Expiry::NONE).await.unwrap();

    let stored = String::from_utf8(shard.stored("object").unwrap()).unwrap();
    assert_eq!(stored, r#"{"Str":"test","Num":1}"#);

    let output: Object = client.get_object("object").await.unwrap();
    assert_eq!(output, input);
}

#[tokio::test]
async fn test_get_object_decode_failure_is_distinct_from_miss() {
    let shard = Arc::new(CountingShardClient::new());
    shard.insert("garbage", b"{not json");
    let (_clock, client) = client_with(shard);

    let err = client.get_object::<Object>("garbage").await.unwrap_err();
    assert!(err.is_serialization());
    // The get itself succeeded
    assert_eq!(client.counters().hits, 1);

    let err = client.get_object::<Object>("absent").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_set_object_encode_failure_skips_network() {
    let shard = Arc::new(CountingShardClient::new());
    let (_clock, client) = client_with(shard.clone());

    // JSON object keys must be strings
    let mut bad: HashMap<(i32, i32), i32> = HashMap::new();
    bad.insert((1, 2), 3);

    let err = client.set_object("bad", &bad, Expiry::NONE).await.unwrap_err();
    assert!(err.is_serialization());
    assert_eq!(shard.calls(), 0);
    assert_eq!(client.counters().requests, 0);
}

#[tokio::test]
async fn test_del_and_exists() {
    let shard = Arc::new(CountingShardClient::new());
    let (_clock, client) = client_with(shard);

    client.set_string("key1", "v1", Expiry::NONE).await.unwrap();
    assert_eq!(client.exists("key1").await.unwrap(), 1);
    assert_eq!(client.del("key1").await.unwrap(), 1);
    assert_eq!(client.del("key1").await.unwrap(), 0);
    assert_eq!(client.exists("key1").await.unwrap(), 0);

    // set + two dels; exists is not recorded
    let counters = client.counters();
    assert_eq!(counters.requests, 3);
    assert_eq!(counters.hits, 0);
    assert_eq!(counters.misses, 0);
}

#[tokio::test]
async fn test_empty_key_is_rejected_before_io() {
    let shard = Arc::new(CountingShardClient::new());
    let (_clock, client) = client_with(shard.clone());

    assert!(matches!(
        client.get("").await,
        Err(Error::InvalidArgument { .. })
    ));
    assert!(client.set("", b"v", Expiry::NONE).await.is_err());
    assert_eq!(shard.calls(), 0);
    assert_eq!(client.counters().requests, 0);
}

#[tokio::test]
async fn test_post_reset_single_get_is_reported_alone() {
    let shard = Arc::new(CountingShardClient::new());
    shard.insert("key1", b"v1");
    let (clock, client) = client_with(shard);

    for _ in 0..100 {
        client.get("key1").await.unwrap();
    }
    clock.advance(Duration::from_secs(1));
    assert_eq!(client.stats().queries_per_second, 100);

    client.get("missing").await.unwrap_err();
    clock.advance(Duration::from_secs(1));
    let report = client.stats();
    assert_eq!(report.queries_per_second, 1);
    assert_eq!(report.hit_ratio, 0.0);
}

#[tokio::test]
async fn test_stats_json_shape() {
    let shard = Arc::new(CountingShardClient::new());
    let (_clock, client) = client_with(shard);

    let json = client.stats_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    for field in [
        "startTime",
        "endTime",
        "hitRatio",
        "meanLatencyMillis",
        "queriesPerSecond",
    ] {
        assert!(value.get(field).is_some(), "missing field {field}");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_gets_against_always_hit_backend() {
    let shard = Arc::new(CountingShardClient::always_hit());
    let (clock, client) = client_with(shard);

    let tasks: Vec<_> = (0..8)
        .map(|t| {
            let client = client.clone();
            tokio::spawn(async move {
                for i in 0..1000 {
                    client.get(&format!("key-{t}-{i}")).await.unwrap();
                }
            })
        })
        .collect();
    for task in futures::future::join_all(tasks).await {
        task.unwrap();
    }

    assert_eq!(client.counters().hits, 8000);
    clock.advance(Duration::from_secs(1));
    let report = client.stats();
    assert_eq!(report.hit_ratio, 100.0);
    assert!(report.queries_per_second > 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_gets_on_system_clock() {
    let shard = Arc::new(CountingShardClient::always_hit());
    let client = CacheClient::new(shard);

    let tasks: Vec<_> = (0..4)
        .map(|_| {
            let client = client.clone();
            tokio::spawn(async move {
                for _ in 0..1000 {
                    client.get("key1").await.unwrap();
                }
            })
        })
        .collect();
    for task in futures::future::join_all(tasks).await {
        task.unwrap();
    }
    tokio::time::sleep(Duration::from_millis(5)).await;

    let report = client.stats();
    assert_eq!(report.hit_ratio, 100.0);
    assert!(report.queries_per_second > 0);
    assert!(report.end_time > report.start_time);
}

/// JSON behind a version header, to exercise a non-default encoding
struct VersionedJson;

impl Serializer for VersionedJson {
    fn name() -> &'static str {
        "versioned-json"
    }

    fn encode<T: Serialize + ?Sized>(value: &T) -> shardcache_domain::Result<Vec<u8>> {
        let mut bytes = b"v1:".to_vec();
        bytes.extend(JsonSerializer::encode(value)?);
        Ok(bytes)
    }

    fn decode<T: DeserializeOwned>(bytes: &[u8]) -> shardcache_domain::Result<T> {
        let body = bytes
            .strip_prefix(b"v1:")
            .ok_or_else(|| Error::serialization("missing v1 header"))?;
        JsonSerializer::decode(body)
    }
}

#[tokio::test]
async fn test_with_serializer_switches_encoding() {
    let shard = Arc::new(CountingShardClient::new());
    let client = CacheClient::new(shard.clone()).with_serializer::<VersionedJson>();
    let value = Object {
        text: "a".to_string(),
        num: 7,
    };

    client
        .set_object("obj", &value, Expiry::NONE)
        .await
        .unwrap();
    assert_eq!(shard.stored("obj").unwrap(), br#"v1:{"Str":"a","Num":7}"#);
    assert_eq!(client.get_object::<Object>("obj").await.unwrap(), value);

    // Plain JSON lacks the header
    shard.insert("plain", br#"{"Str":"b","Num":1}"#);
    let err = client.get_object::<Object>("plain").await.unwrap_err();
    assert!(matches!(err, Error::Serialization { .. }));
    assert!(err.to_string().contains("missing v1 header"));

    let err = client
        .batch_get_objects::<Object, _, _>(["obj", "plain"])
        .await
        .unwrap_err();
    match err {
        Error::PartialBatchDecode { key, .. } => assert_eq!(key, "plain"),
        other => panic!("unexpected error: {other:?}"),
    }
}
