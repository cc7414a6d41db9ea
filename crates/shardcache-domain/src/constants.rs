//! Domain layer constants
//!
//! Defaults for the shard client option set and the stats window.
//! Infrastructure-specific constants live in `shardcache_infrastructure::constants`.

// ============================================================================
// SHARD CLIENT DEFAULTS
// ============================================================================

/// Default interval between shard heartbeats in seconds
pub const DEFAULT_HEARTBEAT_INTERVAL_SECS: u64 = 1;

/// Default logical database index on every shard
pub const DEFAULT_DATABASE_INDEX: i64 = 0;

/// Default number of retries for a failed command (0 disables retries)
pub const DEFAULT_MAX_RETRIES: u32 = 0;

/// Default dial timeout in seconds
pub const DEFAULT_DIAL_TIMEOUT_SECS: u64 = 5;

/// Default read timeout in seconds
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 3;

/// Default write timeout in seconds
pub const DEFAULT_WRITE_TIMEOUT_SECS: u64 = 3;

/// Default number of connections per shard
pub const DEFAULT_POOL_SIZE: usize = 10;

/// Default time to wait for a pooled connection in seconds
pub const DEFAULT_POOL_TIMEOUT_SECS: u64 = 4;

/// Default idle timeout for pooled connections in seconds
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 300;

/// Default interval between idle connection checks in seconds
pub const DEFAULT_IDLE_CHECK_INTERVAL_SECS: u64 = 60;

// ============================================================================
// SHARD RING CONSTANTS
// ============================================================================

/// Virtual nodes placed on the ring for each live shard
pub const RING_VNODES_PER_SHARD: usize = 100;

/// Consecutive failed heartbeats before a shard is taken off the ring
pub const SHARD_DOWN_THRESHOLD: u32 = 3;

/// Separator between shard name and address in `name:host:port`
pub const SHARD_ADDRESS_SEPARATOR: char = ':';

// ============================================================================
// STATS CONSTANTS
// ============================================================================

/// Nanoseconds per millisecond
pub const NANOS_PER_MILLI: i64 = 1_000_000;

/// Milliseconds per second
pub const MILLIS_PER_SEC: i64 = 1_000;
