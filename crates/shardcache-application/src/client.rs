//! Instrumented cache client
//!
//! [`CacheClient`] is the single entry point for cache operations. Every
//! call is timed and recorded into the client's [`StatsAggregator`];
//! recording is lock-free and cannot fail, so it never gets in the way of
//! the data operation. Errors from the shard client are logged and returned
//! unchanged. Nothing is retried here; retries belong to the shard client.
//!
//! ## Example
//!
//! ```ignore
//! use shardcache_application::CacheClient;
//! use shardcache_domain::Expiry;
//!
//! let client = CacheClient::new(shard);
//! client.set_object("user:1", &user, Expiry::from_secs(60)).await?;
//! let user: User = client.get_object("user:1").await?;
//! println!("{}", client.stats_json()?);
//! ```

use crate::batch::{BatchExecutor, decode_in_order};
use crate::serializer::{JsonSerializer, Serializer};
use crate::stats::{Clock, StatsAggregator};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shardcache_domain::error::{Error, Result};
use shardcache_domain::ports::ShardClient;
use shardcache_domain::value_objects::{BatchResult, CacheKey, Expiry, StatsCounters, StatsReport};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Cache facade over a shared shard client
///
/// Clones share the same shard client and the same stats window.
pub struct CacheClient<S = JsonSerializer> {
    shard: Arc<dyn ShardClient>,
    batch: BatchExecutor,
    stats: Arc<StatsAggregator>,
    _serializer: PhantomData<fn() -> S>,
}

impl CacheClient<JsonSerializer> {
    /// Create a client with JSON encoding and a window starting now
    pub fn new(shard: Arc<dyn ShardClient>) -> Self {
        info!(provider = shard.provider_name(), "cache client created");
        Self {
            batch: BatchExecutor::new(Arc::clone(&shard)),
            shard,
            stats: Arc::new(StatsAggregator::new()),
            _serializer: PhantomData,
        }
    }
}

// Construction and configuration
impl<S: Serializer> CacheClient<S> {
    /// Replace the stats clock, starting a fresh window at its current time
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.stats = Arc::new(StatsAggregator::with_clock(clock));
        self
    }

    /// Switch the encoding used for structured values
    pub fn with_serializer<T: Serializer>(self) -> CacheClient<T> {
        CacheClient {
            shard: self.shard,
            batch: self.batch,
            stats: self.stats,
            _serializer: PhantomData,
        }
    }
}

// Scalar operations
impl<S: Serializer> CacheClient<S> {
    /// Fetch the raw value stored under `key`
    ///
    /// Any error, including [`Error::NotFound`], counts as a miss.
    pub async fn get(&self, key: &str) -> Result<Vec<u8>> {
        CacheKey::validate(key)?;
        let start = Instant::now();
        let result = self.shard.get(key).await;
        self.stats.record_get(result.is_ok(), start.elapsed());

        if let Err(e) = &result {
            if e.is_not_found() {
                debug!(key, "cache: miss");
            } else {
                warn!(key, error = %e, "cache: get failed");
            }
        }
        result
    }

    /// Store a raw value under `key`
    pub async fn set<V, E>(&self, key: &str, value: V, expiry: E) -> Result<()>
    where
        V: AsRef<[u8]>,
        E: Into<Expiry>,
    {
        CacheKey::validate(key)?;
        let expiry = expiry.into();
        let start = Instant::now();
        let result = self.shard.set(key, value.as_ref(), expiry).await;
        self.stats.record_request(start.elapsed());

        if let Err(e) = &result {
            warn!(key, error = %e, "cache: set failed");
        }
        result
    }

    /// Fetch a UTF-8 string
    pub async fn get_string(&self, key: &str) -> Result<String> {
        let bytes = self.get(key).await?;
        String::from_utf8(bytes).map_err(|e| {
            warn!(key, error = %e, "cache: stored value is not UTF-8");
            Error::from(e)
        })
    }

    /// Store a string
    pub async fn set_string<E: Into<Expiry>>(&self, key: &str, value: &str, expiry: E) -> Result<()> {
        self.set(key, value, expiry).await
    }

    /// Fetch and decode a structured value
    ///
    /// A decode failure is reported as [`Error::Serialization`], distinct
    /// from a miss.
    pub async fn get_object<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let bytes = self.get(key).await?;
        S::decode(&bytes).map_err(|e| {
            warn!(
                key,
                target_type = std::any::type_name::<T>(),
                error = %e,
                "cache: decode failed"
            );
            e
        })
    }

    /// Encode and store a structured value
    ///
    /// An encode failure returns before any network call and records nothing.
    pub async fn set_object<T, E>(&self, key: &str, value: &T, expiry: E) -> Result<()>
    where
        T: Serialize + ?Sized,
        E: Into<Expiry>,
    {
        let bytes = S::encode(value).map_err(|e| {
            warn!(key, error = %e, "cache: encode failed");
            e
        })?;
        self.set(key, bytes, expiry).await
    }

    /// Delete `key`, returning how many keys were removed
    ///
    /// Counts as one request whatever the outcome.
    pub async fn del(&self, key: &str) -> Result<u64> {
        CacheKey::validate(key)?;
        let start = Instant::now();
        let result = self.shard.del(key).await;
        self.stats.record_request(start.elapsed());

        if let Err(e) = &result {
            warn!(key, error = %e, "cache: del failed");
        }
        result
    }

    /// Count whether `key` exists
    ///
    /// Existence checks are not gets and leave the stats window untouched.
    pub async fn exists(&self, key: &str) -> Result<u64> {
        CacheKey::validate(key)?;
        self.shard.exists(key).await.map_err(|e| {
            warn!(key, error = %e, "cache: exists failed");
            e
        })
    }

    /// Check that the shard client answers; not recorded in stats
    pub async fn ping(&self) -> Result<()> {
        self.shard.ping().await
    }

    /// Stop the shard client's background work
    pub fn shutdown(&self) {
        info!(provider = self.shard.provider_name(), "cache client shutting down");
        self.shard.shutdown();
    }
}

// Batch operations
impl<S: Serializer> CacheClient<S> {
    /// Fetch several keys in one pipelined round trip
    ///
    /// Fails with [`Error::EmptyInput`] before any I/O when `keys` is empty.
    /// Missing keys appear as per-key errors inside the result.
    pub async fn batch_get<I, K>(&self, keys: I) -> Result<BatchResult>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        let keys = BatchExecutor::prepare_keys(keys)?;
        self.batch_get_prepared(&keys).await
    }

    /// Store several raw values in one pipelined round trip
    ///
    /// A pipeline failure is reported once for the whole batch.
    pub async fn batch_set<I, K, V, E>(&self, entries: I, expiry: E) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<[u8]>,
        E: Into<Expiry>,
    {
        let entries = BatchExecutor::prepare_entries(entries)?;
        self.batch_set_prepared(&entries, expiry.into()).await
    }

    /// Fetch several UTF-8 strings
    ///
    /// The first key that is missing or not UTF-8 aborts the call with
    /// [`Error::PartialBatchDecode`].
    pub async fn batch_get_strings<I, K>(&self, keys: I) -> Result<HashMap<String, String>>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        let keys = BatchExecutor::prepare_keys(keys)?;
        let result = self.batch_get_prepared(&keys).await?;
        decode_in_order(&keys, result, |_, bytes| Ok(String::from_utf8(bytes)?))
            .inspect_err(|e| warn!(error = %e, "cache: batch string decode aborted"))
    }

    /// Store several strings
    pub async fn batch_set_strings<I, K, V, E>(&self, entries: I, expiry: E) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
        E: Into<Expiry>,
    {
        let entries = BatchExecutor::prepare_entries(
            entries
                .into_iter()
                .map(|(k, v)| (k, v.as_ref().as_bytes().to_vec())),
        )?;
        self.batch_set_prepared(&entries, expiry.into()).await
    }

    /// Fetch and decode several structured values
    ///
    /// The first key that is missing or fails to decode aborts the call with
    /// [`Error::PartialBatchDecode`]; later keys are not decoded.
    pub async fn batch_get_objects<T, I, K>(&self, keys: I) -> Result<HashMap<String, T>>
    where
        T: DeserializeOwned,
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        let keys = BatchExecutor::prepare_keys(keys)?;
        let result = self.batch_get_prepared(&keys).await?;
        decode_in_order(&keys, result, |_, bytes| S::decode(&bytes))
            .inspect_err(|e| warn!(error = %e, "cache: batch object decode aborted"))
    }

    /// Encode and store several structured values
    ///
    /// The first encode failure aborts before any network call.
    pub async fn batch_set_objects<T, I, K, E>(&self, entries: I, expiry: E) -> Result<()>
    where
        T: Serialize,
        I: IntoIterator<Item = (K, T)>,
        K: AsRef<str>,
        E: Into<Expiry>,
    {
        let mut encoded = Vec::new();
        for (key, value) in entries {
            let bytes = S::encode(&value).map_err(|e| {
                warn!(key = key.as_ref(), error = %e, "cache: encode failed");
                e
            })?;
            encoded.push((key, bytes));
        }
        let entries = BatchExecutor::prepare_entries(encoded)?;
        self.batch_set_prepared(&entries, expiry.into()).await
    }

    async fn batch_get_prepared(&self, keys: &[String]) -> Result<BatchResult> {
        let start = Instant::now();
        let result = self.batch.get(keys).await;
        let elapsed = start.elapsed();

        match &result {
            Ok(batch) => {
                self.stats
                    .record_batch_get(batch.hit_count() as u64, batch.miss_count() as u64, elapsed);
            }
            Err(e) => {
                self.stats.record_batch_get(0, keys.len() as u64, elapsed);
                warn!(keys = keys.len(), error = %e, "cache: batch get failed");
            }
        }
        result
    }

    async fn batch_set_prepared(&self, entries: &[(String, Vec<u8>)], expiry: Expiry) -> Result<()> {
        let start = Instant::now();
        let result = self.batch.set(entries, expiry).await;
        self.stats
            .record_requests(entries.len() as i64, start.elapsed());

        if let Err(e) = &result {
            warn!(entries = entries.len(), error = %e, "cache: batch set failed");
        }
        result
    }
}

// Stats
impl<S: Serializer> CacheClient<S> {
    /// Close the current stats window and report on it
    pub fn stats(&self) -> StatsReport {
        self.stats.snapshot()
    }

    /// Close the current stats window and report on it as JSON text
    pub fn stats_json(&self) -> Result<String> {
        self.stats().to_json()
    }

    /// Raw counters of the open window
    pub fn counters(&self) -> StatsCounters {
        self.stats.counters()
    }
}

impl<S> Clone for CacheClient<S> {
    fn clone(&self) -> Self {
        Self {
            shard: Arc::clone(&self.shard),
            batch: self.batch.clone(),
            stats: Arc::clone(&self.stats),
            _serializer: PhantomData,
        }
    }
}

impl<S> fmt::Debug for CacheClient<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheClient")
            .field("shard", &self.shard)
            .field("stats", &self.stats)
            .finish()
    }
}
