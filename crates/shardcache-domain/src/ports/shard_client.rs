//! Shard Client Port
//!
//! Port for sharded key/value backends. Implementations route every key to
//! one shard (typically with consistent hashing) and own connection pooling,
//! timeouts, retries and failover. The cache facade treats them as opaque.
//!
//! ## Contract
//!
//! - `get` on an absent key fails with [`Error::NotFound`](crate::Error::NotFound).
//! - Transport problems fail with [`Error::Transport`](crate::Error::Transport).
//! - `pipeline_get` returns one outcome per requested key, in request order.
//!   A missing key is a per-key `NotFound`, never a pipeline failure.
//! - `pipeline_set` reports a single error for the whole pipeline.

use crate::error::Result;
use crate::value_objects::Expiry;
use async_trait::async_trait;

/// Sharded key/value backend used by the cache facade
///
/// # Example
///
/// ```ignore
/// use shardcache_domain::ports::ShardClient;
///
/// shard.set("user:1", b"alice", Expiry::NONE).await?;
/// let value = shard.get("user:1").await?;
/// ```
#[async_trait]
pub trait ShardClient: Send + Sync + std::fmt::Debug {
    /// Fetch the raw value stored under `key`
    async fn get(&self, key: &str) -> Result<Vec<u8>>;

    /// Store `value` under `key`
    ///
    /// # Arguments
    /// * `key` - The cache key
    /// * `value` - Raw payload
    /// * `expiry` - Entry lifetime, [`Expiry::NONE`] for no expiration
    async fn set(&self, key: &str, value: &[u8], expiry: Expiry) -> Result<()>;

    /// Remove `key`, returning how many keys were deleted (0 or 1)
    async fn del(&self, key: &str) -> Result<u64>;

    /// Count how many of the given keys exist (0 or 1 for one key)
    async fn exists(&self, key: &str) -> Result<u64>;

    /// Fetch several keys in one pipelined round trip
    ///
    /// # Returns
    /// One outcome per key, in the order of `keys`
    async fn pipeline_get(&self, keys: &[String]) -> Result<Vec<Result<Vec<u8>>>>;

    /// Store several entries in one pipelined round trip
    async fn pipeline_set(&self, entries: &[(String, Vec<u8>)], expiry: Expiry) -> Result<()>;

    /// Check that at least one shard answers
    async fn ping(&self) -> Result<()>;

    /// Name of this implementation (e.g. "redis", "memory")
    fn provider_name(&self) -> &str;

    /// Stop background work such as heartbeats; the default does nothing
    fn shutdown(&self) {}
}
