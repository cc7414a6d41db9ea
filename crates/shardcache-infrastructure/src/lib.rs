//! # shardcache infrastructure
//!
//! Cross-cutting concerns around the cache client: configuration loading,
//! logging setup, error context helpers and the bootstrap that wires a
//! configured shard client into a [`CacheClient`](shardcache_application::CacheClient).

pub mod bootstrap;
pub mod config;
pub mod constants;
pub mod error_ext;
pub mod logging;

pub use bootstrap::{build_cache_client, create_shard_client};
pub use config::{AppConfig, ConfigLoader, LoggingConfig, ShardProviderKind, StatsConfig};
