//! In-memory shard client
//!
//! Single-process store implementing the [`ShardClient`] port on a Moka
//! cache. Each entry carries its own time to live; Moka evicts expired
//! entries in its housekeeping whether or not they are read again.
//!
//! ## Example
//!
//! ```ignore
//! use shardcache_providers::shard::MemoryShardClient;
//!
//! let shard = Arc::new(MemoryShardClient::new());
//! let client = CacheClient::new(shard);
//! ```

use async_trait::async_trait;
use moka::future::Cache;
use shardcache_domain::error::{Error, Result};
use shardcache_domain::ports::ShardClient;
use shardcache_domain::value_objects::Expiry;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct Entry {
    value: Vec<u8>,
    ttl: Option<Duration>,
}

impl Entry {
    fn new(value: Vec<u8>, expiry: Expiry) -> Self {
        let ttl = (!expiry.is_none()).then(|| expiry.as_duration());
        Self { value, ttl }
    }
}

/// Expiry policy reading the lifetime stored with each entry
struct EntryTtl;

impl moka::Expiry<String, Entry> for EntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        entry: &Entry,
        _created_at: Instant,
    ) -> Option<Duration> {
        entry.ttl
    }

    // An overwrite restarts the lifetime, like SET on a shard
    fn expire_after_update(
        &self,
        _key: &String,
        entry: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        entry.ttl
    }
}

/// In-memory shard client backed by a Moka cache
#[derive(Clone)]
pub struct MemoryShardClient {
    cache: Cache<String, Entry>,
}

impl Default for MemoryShardClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryShardClient {
    /// Create an empty store
    pub fn new() -> Self {
        let cache = Cache::builder().expire_after(EntryTtl).build();
        Self { cache }
    }

    /// Number of live entries
    ///
    /// Runs pending housekeeping first so expired entries are not counted.
    pub async fn len(&self) -> usize {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count() as usize
    }

    /// True when nothing live is stored
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Remove every entry
    pub async fn clear(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }

    async fn live_value(&self, key: &str) -> Option<Vec<u8>> {
        self.cache.get(key).await.map(|entry| entry.value)
    }
}

#[async_trait]
impl ShardClient for MemoryShardClient {
    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        self.live_value(key)
            .await
            .ok_or_else(|| Error::not_found(key))
    }

    async fn set(&self, key: &str, value: &[u8], expiry: Expiry) -> Result<()> {
        self.cache
            .insert(key.to_string(), Entry::new(value.to_vec(), expiry))
            .await;
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<u64> {
        let existed = self.cache.contains_key(key);
        self.cache.invalidate(key).await;
        Ok(u64::from(existed))
    }

    async fn exists(&self, key: &str) -> Result<u64> {
        Ok(u64::from(self.cache.contains_key(key)))
    }

    async fn pipeline_get(&self, keys: &[String]) -> Result<Vec<Result<Vec<u8>>>> {
        let mut outcomes = Vec::with_capacity(keys.len());
        for key in keys {
            outcomes.push(
                self.live_value(key)
                    .await
                    .ok_or_else(|| Error::not_found(key.as_str())),
            );
        }
        Ok(outcomes)
    }

    async fn pipeline_set(&self, entries: &[(String, Vec<u8>)], expiry: Expiry) -> Result<()> {
        for (key, value) in entries {
            self.cache
                .insert(key.clone(), Entry::new(value.clone(), expiry))
                .await;
        }
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    fn provider_name(&self) -> &str {
        "memory"
    }
}

impl std::fmt::Debug for MemoryShardClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryShardClient")
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}
