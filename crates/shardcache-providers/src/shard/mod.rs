//! Shard client providers
//!
//! ## Provider Selection Guide
//!
//! - **Development/Testing**: use `MemoryShardClient`
//! - **Production**: use `RedisRingShardClient` with one entry per Redis shard

pub mod hash_ring;
pub mod health;
#[cfg(feature = "shard-memory")]
pub mod memory;
#[cfg(feature = "shard-redis")]
pub mod redis_ring;

pub use hash_ring::HashRing;
pub use health::ShardHealth;
#[cfg(feature = "shard-memory")]
pub use memory::MemoryShardClient;
#[cfg(feature = "shard-redis")]
pub use redis_ring::{RedisRingShardClient, connection_info};
