//! Bootstrap
//!
//! Builds the configured shard client and wraps it in a [`CacheClient`].
//!
//! ```ignore
//! let config = ConfigLoader::new().load()?;
//! let client = build_cache_client(&config).await?;
//! client.set_string("greeting", "hello", Expiry::NONE).await?;
//! ```

use crate::config::{AppConfig, ShardProviderKind};
use shardcache_application::CacheClient;
use shardcache_domain::error::Result;
use shardcache_domain::ports::ShardClient;
use shardcache_providers::shard::{MemoryShardClient, RedisRingShardClient};
use std::sync::Arc;
use tracing::info;

/// Create the shard client selected by `config.provider`
pub async fn create_shard_client(config: &AppConfig) -> Result<Arc<dyn ShardClient>> {
    info!(provider = %config.provider, "creating shard client");
    let shard: Arc<dyn ShardClient> = match config.provider {
        ShardProviderKind::Redis => {
            Arc::new(RedisRingShardClient::connect(config.shards.clone()).await?)
        }
        ShardProviderKind::Memory => Arc::new(MemoryShardClient::new()),
    };
    Ok(shard)
}

/// Create the configured shard client and a cache client over it
pub async fn build_cache_client(config: &AppConfig) -> Result<CacheClient> {
    let shard = create_shard_client(config).await?;
    Ok(CacheClient::new(shard))
}
