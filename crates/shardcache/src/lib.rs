//! # shardcache
//!
//! An instrumented cache client over a sharded key/value store. Every
//! operation is timed and counted, and the stats window can be closed at
//! any moment into a JSON report with hit ratio, mean latency and QPS.
//!
//! ## Example
//!
//! ```ignore
//! use shardcache::infrastructure::{ConfigLoader, build_cache_client};
//! use shardcache::domain::Expiry;
//!
//! let config = ConfigLoader::new().load()?;
//! let client = build_cache_client(&config).await?;
//! client.set_string("greeting", "hello", Expiry::from_secs(60)).await?;
//! let greeting = client.get_string("greeting").await?;
//! println!("{}", client.stats_json()?);
//! ```
//!
//! ## Architecture
//!
//! - `domain` - error type, value objects and the `ShardClient` port
//! - `application` - the `CacheClient` facade, batch executor, stats aggregator
//! - `providers` - Redis hash ring and in-memory shard clients
//! - `infrastructure` - configuration, logging and bootstrap

/// Domain layer - error type, value objects and ports
///
/// Re-exports from the domain crate for convenience
pub mod domain {
    pub use shardcache_domain::*;
}

/// Application layer - cache client, batch executor, stats
///
/// Re-exports from the application crate for convenience
pub mod application {
    pub use shardcache_application::*;
}

/// Shard client implementations
///
/// Re-exports from the providers crate for convenience
pub mod providers {
    pub use shardcache_providers::*;
}

/// Infrastructure layer - configuration, logging, bootstrap
///
/// Re-exports from the infrastructure crate for convenience
pub mod infrastructure {
    pub use shardcache_infrastructure::*;
}

/// Sample load driver used by the `shardcache` binary
pub mod driver;

pub use application::{CacheClient, JsonSerializer, Serializer};
pub use domain::{BatchResult, Error, Expiry, Result, ShardClient, StatsReport};
