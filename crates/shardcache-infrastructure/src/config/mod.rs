//! Configuration
//!
//! [`AppConfig`] is assembled by [`ConfigLoader`] from defaults, a TOML
//! file and `SHARDCACHE_` environment variables, then validated.

pub mod loader;
pub mod types;

pub use loader::{ConfigLoader, validate_app_config};
pub use types::{AppConfig, LoggingConfig, ShardProviderKind, StatsConfig};
