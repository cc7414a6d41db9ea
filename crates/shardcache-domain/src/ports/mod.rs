//! Domain Port Interfaces
//!
//! Boundary contracts implemented outside the domain. Providers implement
//! them; the application layer depends only on the traits.

/// Shard client port
pub mod shard_client;

pub use shard_client::ShardClient;
