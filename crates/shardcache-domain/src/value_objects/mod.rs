//! Domain Value Objects
//!
//! Immutable values exchanged between the cache facade and shard clients.
//!
//! | Value Object | Description |
//! |--------------|-------------|
//! | [`CacheKey`] | Validated, non-empty cache key |
//! | [`Expiry`] | Entry lifetime, zero meaning "never expires" |
//! | [`BatchResult`] | Per-key outcomes of a pipelined get |
//! | [`StatsReport`] | Derived metrics for one stats window |
//! | [`ShardClientConfig`] | Recognized shard client option set |

pub mod batch;
pub mod config;
pub mod expiry;
pub mod key;
pub mod stats;

pub use batch::BatchResult;
pub use config::{ShardAddress, ShardClientConfig, parse_shard_addresses};
pub use expiry::{Expiry, ExpiryPrecision};
pub use key::CacheKey;
pub use stats::{StatsCounters, StatsReport};
