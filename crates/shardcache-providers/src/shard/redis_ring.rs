//! Redis shards on a consistent hash ring
//!
//! Keys are routed to one of several named Redis shards through a
//! [`HashRing`]. A heartbeat task pings every configured shard; a shard that
//! misses [`SHARD_DOWN_THRESHOLD`] heartbeats in a row leaves the ring and
//! its keys move to the surviving shards until it answers again.
//!
//! ## Features
//!
//! - `pool_size` connections per shard, dialed lazily and reused round-robin
//! - Dial, read and write timeouts applied per command
//! - Up to `max_retries` retries for transport failures
//! - Pipelined batches grouped per shard, shards queried concurrently
//!
//! ## Example
//!
//! ```ignore
//! use shardcache_domain::ShardClientConfig;
//! use shardcache_providers::shard::RedisRingShardClient;
//!
//! let config = ShardClientConfig::with_shards(["s1:localhost:6379", "s2:localhost:6380"]);
//! let shard = RedisRingShardClient::connect(config).await?;
//! // ...
//! shard.shutdown();
//! ```

use super::hash_ring::HashRing;
use super::health::ShardHealth;
use async_trait::async_trait;
use futures::future::join_all;
use redis::aio::ConnectionManager;
use redis::{
    Client, Cmd, ConnectionAddr, ConnectionInfo, IntoConnectionInfo, RedisConnectionInfo, RedisError,
};
use shardcache_domain::constants::SHARD_DOWN_THRESHOLD;
use shardcache_domain::error::{Error, Result};
use shardcache_domain::ports::ShardClient;
use shardcache_domain::value_objects::{Expiry, ExpiryPrecision, ShardAddress, ShardClientConfig};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock, Weak};
use std::time::Duration;
use tokio::sync::OnceCell;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Connection settings for one shard
///
/// Carries the password and database index, so every pooled connection
/// authenticates and selects on connect. An empty password is ignored.
pub fn connection_info(
    shard: &ShardAddress,
    config: &ShardClientConfig,
) -> Result<ConnectionInfo> {
    let mut redis = RedisConnectionInfo::default().set_db(config.database_index);
    if let Some(password) = config.password.as_deref().filter(|p| !p.is_empty()) {
        redis = redis.set_password(password);
    }
    let info = ConnectionAddr::Tcp(shard.host().to_string(), shard.port())
        .into_connection_info()
        .map_err(|e| {
            Error::configuration_with_source(
                format!("invalid redis address for shard '{}'", shard.name),
                e,
            )
        })?;
    Ok(info.set_redis_settings(redis))
}

/// A command attempt that failed, and whether trying again can help
struct Failure {
    error: Error,
    retryable: bool,
}

impl Failure {
    fn from_redis(what: &str, shard: &str, source: RedisError) -> Self {
        let retryable = source.is_io_error() || source.is_timeout();
        Self {
            error: Error::transport_with_source(
                format!("redis {what} on shard '{shard}' failed: {source}"),
                source,
            ),
            retryable,
        }
    }

    fn timed_out(what: &str, shard: &str, limit: Duration) -> Self {
        Self {
            error: Error::transport(format!(
                "redis {what} on shard '{shard}' timed out after {limit:?}"
            )),
            retryable: true,
        }
    }
}

/// Await `fut`, giving up after `limit`; a zero limit waits forever
async fn bounded<T, F>(limit: Duration, fut: F) -> Option<T>
where
    F: Future<Output = T>,
{
    if limit.is_zero() {
        return Some(fut.await);
    }
    tokio::time::timeout(limit, fut).await.ok()
}

struct ShardPool {
    name: String,
    address: String,
    client: Client,
    slots: Vec<OnceCell<ConnectionManager>>,
    next: AtomicUsize,
    health: ShardHealth,
}

impl ShardPool {
    fn open(shard: &ShardAddress, config: &ShardClientConfig) -> Result<Self> {
        let client = Client::open(connection_info(shard, config)?).map_err(|e| {
            Error::configuration_with_source(
                format!("cannot open redis client for shard '{}'", shard.name),
                e,
            )
        })?;
        let slots = (0..config.pool_size.max(1)).map(|_| OnceCell::new()).collect();

        Ok(Self {
            name: shard.name.clone(),
            address: shard.address.clone(),
            client,
            slots,
            next: AtomicUsize::new(0),
            health: ShardHealth::new(SHARD_DOWN_THRESHOLD),
        })
    }

    /// Next pooled connection, dialing the slot on first use
    async fn connection(&self, config: &ShardClientConfig) -> std::result::Result<ConnectionManager, Failure> {
        let index = self.next.fetch_add(1, Ordering::Relaxed) % self.slots.len();
        let slot = &self.slots[index];
        let dial_timeout = config.dial_timeout();

        let acquire = slot.get_or_try_init(|| async {
            match bounded(dial_timeout, ConnectionManager::new(self.client.clone())).await {
                Some(Ok(conn)) => {
                    debug!(shard = %self.name, slot = index, "shard: connection established");
                    Ok(conn)
                }
                Some(Err(e)) => Err(Failure::from_redis("dial", &self.name, e)),
                None => Err(Failure::timed_out("dial", &self.name, dial_timeout)),
            }
        });

        match bounded(config.pool_timeout(), acquire).await {
            Some(Ok(conn)) => Ok(conn.clone()),
            Some(Err(failure)) => Err(failure),
            None => Err(Failure::timed_out(
                "connection acquire",
                &self.name,
                config.pool_timeout(),
            )),
        }
    }
}

impl fmt::Debug for ShardPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShardPool")
            .field("name", &self.name)
            .field("address", &self.address)
            .field("pool_size", &self.slots.len())
            .field("failures", &self.health.failures())
            .finish_non_exhaustive()
    }
}

struct RingState {
    config: ShardClientConfig,
    pools: HashMap<String, ShardPool>,
    ring: RwLock<HashRing>,
}

impl RingState {
    fn route(&self, key: &str) -> Result<&ShardPool> {
        let ring = self
            .ring
            .read()
            .map_err(|_| Error::transport("shard ring lock poisoned"))?;
        let name = ring
            .get(key)
            .ok_or_else(|| Error::transport("no live shards on the ring"))?;
        self.pools
            .get(name)
            .ok_or_else(|| Error::transport(format!("shard '{name}' is not configured")))
    }

    /// Positions of `keys` grouped by the shard that owns them
    fn group<'k, I>(&self, keys: I) -> Result<Vec<(&ShardPool, Vec<usize>)>>
    where
        I: IntoIterator<Item = &'k str>,
    {
        let mut groups: HashMap<&str, (&ShardPool, Vec<usize>)> = HashMap::new();
        for (position, key) in keys.into_iter().enumerate() {
            let pool = self.route(key)?;
            groups
                .entry(pool.name.as_str())
                .or_insert_with(|| (pool, Vec::new()))
                .1
                .push(position);
        }
        Ok(groups.into_values().collect())
    }

    fn live_pools(&self) -> Result<Vec<&ShardPool>> {
        let ring = self
            .ring
            .read()
            .map_err(|_| Error::transport("shard ring lock poisoned"))?;
        let pools: Vec<&ShardPool> = ring
            .shards()
            .iter()
            .filter_map(|name| self.pools.get(name))
            .collect();
        if pools.is_empty() {
            return Err(Error::transport("no live shards on the ring"));
        }
        Ok(pools)
    }

    /// Run `op` on a pooled connection of `pool`, retrying transport failures
    async fn run<T, F, Fut>(&self, pool: &ShardPool, what: &str, limit: Duration, op: F) -> Result<T>
    where
        F: Fn(ConnectionManager) -> Fut,
        Fut: Future<Output = redis::RedisResult<T>>,
    {
        let mut attempt: u32 = 0;
        loop {
            let failure = match pool.connection(&self.config).await {
                Ok(conn) => match bounded(limit, op(conn)).await {
                    Some(Ok(value)) => return Ok(value),
                    Some(Err(e)) => Failure::from_redis(what, &pool.name, e),
                    None => Failure::timed_out(what, &pool.name, limit),
                },
                Err(failure) => failure,
            };

            if !failure.retryable || attempt >= self.config.max_retries {
                return Err(failure.error);
            }
            attempt += 1;
            debug!(
                shard = %pool.name,
                attempt,
                error = %failure.error,
                "shard: retrying {}", what
            );
        }
    }

    /// One heartbeat probe, no retries
    async fn probe(&self, pool: &ShardPool) -> bool {
        let limit = self.config.read_timeout();
        let conn = match pool.connection(&self.config).await {
            Ok(conn) => conn,
            Err(failure) => {
                debug!(shard = %pool.name, error = %failure.error, "shard: heartbeat dial failed");
                return false;
            }
        };
        let ping = async move {
            let mut conn = conn;
            redis::cmd("PING").query_async::<()>(&mut conn).await
        };
        matches!(bounded(limit, ping).await, Some(Ok(())))
    }

    async fn heartbeat(&self) {
        let probes = self.pools.values().map(|pool| async move {
            let healthy = self.probe(pool).await;
            (pool, healthy)
        });

        for (pool, healthy) in join_all(probes).await {
            let belongs = pool.health.record(healthy);
            let Ok(mut ring) = self.ring.write() else {
                warn!("shard: ring lock poisoned, heartbeat skipped");
                return;
            };
            if belongs && ring.add(&pool.name) {
                info!(shard = %pool.name, address = %pool.address, "shard: back up, added to ring");
            } else if !belongs && ring.remove(&pool.name) {
                warn!(
                    shard = %pool.name,
                    address = %pool.address,
                    failures = pool.health.failures(),
                    "shard: down, removed from ring"
                );
            }
        }
    }
}

async fn heartbeat_loop(state: Weak<RingState>, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately
    ticker.tick().await;

    loop {
        ticker.tick().await;
        let Some(state) = state.upgrade() else {
            break;
        };
        state.heartbeat().await;
    }
}

fn set_command(key: &str, value: &[u8], expiry: Expiry) -> Cmd {
    let mut cmd = redis::cmd("SET");
    cmd.arg(key).arg(value);
    match expiry.precision() {
        Some(ExpiryPrecision::Seconds(secs)) => {
            cmd.arg("EX").arg(secs);
        }
        Some(ExpiryPrecision::Millis(millis)) => {
            cmd.arg("PX").arg(millis);
        }
        None => {}
    }
    cmd
}

/// Shard client over Redis shards on a consistent hash ring
pub struct RedisRingShardClient {
    state: Arc<RingState>,
    heartbeat: Mutex<Option<JoinHandle<()>>>,
}

impl RedisRingShardClient {
    /// Build the ring and start the heartbeat task
    ///
    /// Connections are dialed on first use, so an unreachable shard does
    /// not fail construction; it is taken off the ring by the heartbeat.
    /// A zero heartbeat interval disables failover.
    pub async fn connect(config: ShardClientConfig) -> Result<Self> {
        let shards = config.shards()?;
        if shards.is_empty() {
            return Err(Error::configuration("at least one shard address is required"));
        }

        let mut pools = HashMap::with_capacity(shards.len());
        let mut ring = HashRing::new();
        for shard in &shards {
            pools.insert(shard.name.clone(), ShardPool::open(shard, &config)?);
            ring.add(&shard.name);
        }

        let interval = config.heartbeat_interval();
        let state = Arc::new(RingState {
            config,
            pools,
            ring: RwLock::new(ring),
        });

        let heartbeat = if interval.is_zero() {
            debug!("shard: heartbeat disabled");
            None
        } else {
            Some(tokio::spawn(heartbeat_loop(Arc::downgrade(&state), interval)))
        };

        info!(
            shards = shards.len(),
            pool_size = state.config.pool_size,
            "redis shard ring ready"
        );
        Ok(Self {
            state,
            heartbeat: Mutex::new(heartbeat),
        })
    }

    /// Names of the shards currently on the ring
    pub fn live_shards(&self) -> Vec<String> {
        self.state
            .ring
            .read()
            .map(|ring| ring.shards().to_vec())
            .unwrap_or_default()
    }

    /// Name of the shard `key` routes to right now
    pub fn shard_for(&self, key: &str) -> Result<String> {
        self.state.route(key).map(|pool| pool.name.clone())
    }

    /// Stop the heartbeat task; safe to call more than once
    pub fn shutdown(&self) {
        let handle = match self.heartbeat.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(handle) = handle {
            handle.abort();
            info!("redis shard ring shut down");
        }
    }
}

impl Drop for RedisRingShardClient {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl fmt::Debug for RedisRingShardClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisRingShardClient")
            .field("shards", &self.state.pools.len())
            .field("live", &self.live_shards())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ShardClient for RedisRingShardClient {
    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        let pool = self.state.route(key)?;
        let value: Option<Vec<u8>> = self
            .state
            .run(pool, "GET", self.state.config.read_timeout(), move |mut conn| async move {
                redis::cmd("GET").arg(key).query_async(&mut conn).await
            })
            .await?;
        value.ok_or_else(|| Error::not_found(key))
    }

    async fn set(&self, key: &str, value: &[u8], expiry: Expiry) -> Result<()> {
        let pool = self.state.route(key)?;
        let cmd = set_command(key, value, expiry);
        let cmd = &cmd;
        self.state
            .run(pool, "SET", self.state.config.write_timeout(), move |mut conn| async move {
                cmd.query_async::<()>(&mut conn).await
            })
            .await
    }

    async fn del(&self, key: &str) -> Result<u64> {
        let pool = self.state.route(key)?;
        self.state
            .run(pool, "DEL", self.state.config.write_timeout(), move |mut conn| async move {
                redis::cmd("DEL").arg(key).query_async::<u64>(&mut conn).await
            })
            .await
    }

    async fn exists(&self, key: &str) -> Result<u64> {
        let pool = self.state.route(key)?;
        self.state
            .run(pool, "EXISTS", self.state.config.read_timeout(), move |mut conn| async move {
                redis::cmd("EXISTS").arg(key).query_async::<u64>(&mut conn).await
            })
            .await
    }

    async fn pipeline_get(&self, keys: &[String]) -> Result<Vec<Result<Vec<u8>>>> {
        let groups = self.state.group(keys.iter().map(String::as_str))?;
        let limit = self.state.config.read_timeout();
        debug!(keys = keys.len(), shards = groups.len(), "shard: pipelined GET");

        let calls = groups.into_iter().map(|(pool, positions)| async move {
            let mut pipe = redis::pipe();
            for &position in &positions {
                pipe.cmd("GET").arg(&keys[position]);
            }
            let pipe = &pipe;
            let values: Vec<Option<Vec<u8>>> = self
                .state
                .run(pool, "pipelined GET", limit, move |mut conn| async move {
                    pipe.query_async(&mut conn).await
                })
                .await?;
            if values.len() != positions.len() {
                return Err(Error::transport(format!(
                    "shard '{}' returned {} replies for {} keys",
                    pool.name,
                    values.len(),
                    positions.len()
                )));
            }
            Ok::<_, Error>((positions, values))
        });

        let mut outcomes: Vec<Option<Result<Vec<u8>>>> = keys.iter().map(|_| None).collect();
        for reply in join_all(calls).await {
            let (positions, values) = reply?;
            for (position, value) in positions.into_iter().zip(values) {
                outcomes[position] =
                    Some(value.ok_or_else(|| Error::not_found(keys[position].as_str())));
            }
        }

        Ok(outcomes
            .into_iter()
            .zip(keys)
            .map(|(outcome, key)| outcome.unwrap_or_else(|| Err(Error::not_found(key.as_str()))))
            .collect())
    }

    async fn pipeline_set(&self, entries: &[(String, Vec<u8>)], expiry: Expiry) -> Result<()> {
        let groups = self
            .state
            .group(entries.iter().map(|(key, _)| key.as_str()))?;
        let limit = self.state.config.write_timeout();
        debug!(entries = entries.len(), shards = groups.len(), "shard: pipelined SET");

        let calls = groups.into_iter().map(|(pool, positions)| async move {
            let mut pipe = redis::pipe();
            for &position in &positions {
                let (key, value) = &entries[position];
                pipe.add_command(set_command(key, value, expiry)).ignore();
            }
            let pipe = &pipe;
            self.state
                .run(pool, "pipelined SET", limit, move |mut conn| async move {
                    pipe.query_async::<()>(&mut conn).await
                })
                .await
        });

        join_all(calls).await.into_iter().collect()
    }

    async fn ping(&self) -> Result<()> {
        let limit = self.state.config.read_timeout();
        let pings = self.state.live_pools()?.into_iter().map(|pool| {
            self.state.run(pool, "PING", limit, |mut conn| async move {
                redis::cmd("PING").query_async::<()>(&mut conn).await
            })
        });
        let mut last_error = None;
        for outcome in join_all(pings).await {
            match outcome {
                Ok(()) => return Ok(()),
                Err(e) => last_error = Some(e),
            }
        }
        Err(last_error.unwrap_or_else(|| Error::transport("no live shards on the ring")))
    }

    fn provider_name(&self) -> &str {
        "redis"
    }

    fn shutdown(&self) {
        RedisRingShardClient::shutdown(self);
    }
}
