//! Structured value encoding
//!
//! Converts typed values to the byte payloads stored in the cache and back.

use serde::Serialize;
use serde::de::DeserializeOwned;
use shardcache_domain::error::{Error, Result};

/// Byte encoding for structured cache values
pub trait Serializer: Send + Sync + 'static {
    /// Short name used in log lines
    fn name() -> &'static str;

    /// Encode a value into a cache payload
    fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>>;

    /// Decode a cache payload into a value
    fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T>;
}

/// JSON encoding via `serde_json`
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl Serializer for JsonSerializer {
    fn name() -> &'static str {
        "json"
    }

    fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
        serde_json::to_vec(value).map_err(|e| {
            Error::serialization_with_source(format!("failed to encode value: {e}"), e)
        })
    }

    fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
        serde_json::from_slice(bytes).map_err(|e| {
            Error::serialization_with_source(
                format!(
                    "failed to decode {} into {}: {e}",
                    Self::name(),
                    std::any::type_name::<T>()
                ),
                e,
            )
        })
    }
}
