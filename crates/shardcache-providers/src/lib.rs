//! # shardcache - Shard Client Implementations
//!
//! Implementations of the [`ShardClient`] port defined in
//! `shardcache-domain`.
//!
//! | Provider | Feature | Description |
//! |----------|---------|-------------|
//! | [`RedisRingShardClient`](shard::RedisRingShardClient) | `shard-redis` | Redis shards on a consistent hash ring with heartbeat failover |
//! | [`MemoryShardClient`](shard::MemoryShardClient) | `shard-memory` | In-process store for development and tests |
//!
//! ```toml
//! [dependencies]
//! shardcache-providers = { version = "0.1", default-features = false, features = ["shard-memory"] }
//! ```

pub use shardcache_domain::error::{Error, Result};
pub use shardcache_domain::ports::ShardClient;

/// Shard client implementations and the hash ring they route with
pub mod shard;
