//! # shardcache domain
//!
//! Core types shared by every shardcache layer: the error type, the value
//! objects exchanged between the facade and the shard clients, and the
//! [`ShardClient`](ports::ShardClient) port itself.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`error`] | Domain error enum and `Result` alias |
//! | [`constants`] | Shard client defaults and ring constants |
//! | [`value_objects`] | Keys, expiry, batch results, stats reports, shard config |
//! | [`ports`] | Boundary contracts implemented by providers |

pub mod constants;
pub mod error;
pub mod ports;
pub mod value_objects;

pub use error::{Error, Result};
pub use ports::ShardClient;
pub use value_objects::{
    BatchResult, CacheKey, Expiry, ExpiryPrecision, ShardAddress, ShardClientConfig,
    StatsCounters, StatsReport,
};
