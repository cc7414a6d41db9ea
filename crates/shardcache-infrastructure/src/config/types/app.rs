//! Application configuration

use super::{LoggingConfig, StatsConfig};
use serde::{Deserialize, Serialize};
use shardcache_domain::value_objects::ShardClientConfig;
use std::fmt;

/// Which shard client backs the cache
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShardProviderKind {
    /// Redis shards on a consistent hash ring
    Redis,
    /// In-process store, no network
    #[default]
    Memory,
}

impl fmt::Display for ShardProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Redis => write!(f, "redis"),
            Self::Memory => write!(f, "memory"),
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Shard client backend
    pub provider: ShardProviderKind,

    /// Shard client options
    pub shards: ShardClientConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Stats reporting configuration
    pub stats: StatsConfig,
}
