//! Shard client configuration
//!
//! The option set recognized by shard clients. Parsing the file it comes
//! from is the infrastructure layer's job; this type only carries the
//! already-parsed values.

use crate::constants::{
    DEFAULT_DATABASE_INDEX, DEFAULT_DIAL_TIMEOUT_SECS, DEFAULT_HEARTBEAT_INTERVAL_SECS,
    DEFAULT_IDLE_CHECK_INTERVAL_SECS, DEFAULT_IDLE_TIMEOUT_SECS, DEFAULT_MAX_RETRIES,
    DEFAULT_POOL_SIZE, DEFAULT_POOL_TIMEOUT_SECS, DEFAULT_READ_TIMEOUT_SECS,
    DEFAULT_WRITE_TIMEOUT_SECS, SHARD_ADDRESS_SEPARATOR,
};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

/// Shard client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShardClientConfig {
    /// Shards as `name:host:port`
    pub shard_addresses: Vec<String>,

    /// Interval between shard heartbeats in seconds
    pub heartbeat_interval_secs: u64,

    /// Logical database index selected on every shard
    pub database_index: i64,

    /// Password sent on connect, if any
    pub password: Option<String>,

    /// Retries for a command that failed in transport (0 disables)
    pub max_retries: u32,

    /// Dial timeout in seconds
    pub dial_timeout_secs: u64,

    /// Read timeout in seconds
    pub read_timeout_secs: u64,

    /// Write timeout in seconds
    pub write_timeout_secs: u64,

    /// Connections per shard
    pub pool_size: usize,

    /// Time to wait for a pooled connection in seconds
    pub pool_timeout_secs: u64,

    /// Idle timeout for pooled connections in seconds
    pub idle_timeout_secs: u64,

    /// Interval between idle connection checks in seconds
    pub idle_check_interval_secs: u64,
}

impl Default for ShardClientConfig {
    fn default() -> Self {
        Self {
            shard_addresses: Vec::new(),
            heartbeat_interval_secs: DEFAULT_HEARTBEAT_INTERVAL_SECS,
            database_index: DEFAULT_DATABASE_INDEX,
            password: None,
            max_retries: DEFAULT_MAX_RETRIES,
            dial_timeout_secs: DEFAULT_DIAL_TIMEOUT_SECS,
            read_timeout_secs: DEFAULT_READ_TIMEOUT_SECS,
            write_timeout_secs: DEFAULT_WRITE_TIMEOUT_SECS,
            pool_size: DEFAULT_POOL_SIZE,
            pool_timeout_secs: DEFAULT_POOL_TIMEOUT_SECS,
            idle_timeout_secs: DEFAULT_IDLE_TIMEOUT_SECS,
            idle_check_interval_secs: DEFAULT_IDLE_CHECK_INTERVAL_SECS,
        }
    }
}

impl ShardClientConfig {
    /// Create a configuration for the given shard addresses
    pub fn with_shards<I, S>(shards: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            shard_addresses: shards.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Parsed shard addresses
    pub fn shards(&self) -> Result<Vec<ShardAddress>> {
        parse_shard_addresses(&self.shard_addresses)
    }

    /// Heartbeat interval
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs)
    }

    /// Dial timeout
    pub fn dial_timeout(&self) -> Duration {
        Duration::from_secs(self.dial_timeout_secs)
    }

    /// Read timeout
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    /// Write timeout
    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_secs)
    }

    /// Pool timeout
    pub fn pool_timeout(&self) -> Duration {
        Duration::from_secs(self.pool_timeout_secs)
    }
}

/// One named shard
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShardAddress {
    /// Shard name, the identity used on the hash ring
    pub name: String,
    /// `host:port` of the shard
    pub address: String,
}

impl ShardAddress {
    /// Parse `name:host:port`, splitting on the first separator
    pub fn parse(raw: &str) -> Result<Self> {
        let (name, address) = raw.split_once(SHARD_ADDRESS_SEPARATOR).ok_or_else(|| {
            Error::configuration(format!(
                "shard address '{raw}' must have the form name:host:port"
            ))
        })?;
        if name.is_empty() {
            return Err(Error::configuration(format!(
                "shard address '{raw}' has an empty name"
            )));
        }
        let (host, port) = address.rsplit_once(SHARD_ADDRESS_SEPARATOR).ok_or_else(|| {
            Error::configuration(format!("shard address '{raw}' is missing a port"))
        })?;
        if host.is_empty() {
            return Err(Error::configuration(format!(
                "shard address '{raw}' has an empty host"
            )));
        }
        port.parse::<u16>().map_err(|e| {
            Error::configuration_with_source(format!("shard address '{raw}' has an invalid port"), e)
        })?;

        Ok(Self {
            name: name.to_string(),
            address: address.to_string(),
        })
    }

    /// Host part of the address
    pub fn host(&self) -> &str {
        self.address
            .rsplit_once(SHARD_ADDRESS_SEPARATOR)
            .map_or(self.address.as_str(), |(host, _)| host)
    }

    /// Port part of the address
    pub fn port(&self) -> u16 {
        self.address
            .rsplit_once(SHARD_ADDRESS_SEPARATOR)
            .and_then(|(_, port)| port.parse().ok())
            .unwrap_or_default()
    }
}

/// Parse a list of `name:host:port` entries
///
/// Shard names must be unique; a duplicate would silently shadow another
/// shard on the ring.
pub fn parse_shard_addresses<S: AsRef<str>>(raw: &[S]) -> Result<Vec<ShardAddress>> {
    let mut seen = HashSet::with_capacity(raw.len());
    let mut shards = Vec::with_capacity(raw.len());
    for entry in raw {
        let shard = ShardAddress::parse(entry.as_ref())?;
        if !seen.insert(shard.name.clone()) {
            return Err(Error::configuration(format!(
                "duplicate shard name '{}'",
                shard.name
            )));
        }
        shards.push(shard);
    }
    Ok(shards)
}
