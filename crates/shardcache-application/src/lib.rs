//! # shardcache application layer
//!
//! The instrumented cache facade and the logic it composes.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | [`CacheClient`], the single entry point for cache operations |
//! | [`batch`] | Pipelined batch get/set with per-key failure isolation |
//! | [`stats`] | Lock-free stats window with read-compute-subtract snapshots |
//! | [`serializer`] | Structured value encoding (JSON by default) |

pub mod batch;
pub mod client;
pub mod serializer;
pub mod stats;

pub use batch::BatchExecutor;
pub use client::CacheClient;
pub use serializer::{JsonSerializer, Serializer};
pub use stats::{Clock, ManualClock, StatsAggregator, SystemClock};
