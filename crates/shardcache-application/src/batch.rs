//! Batch pipelining
//!
//! Issues many independent gets or sets as one pipelined round trip. A
//! missing key never fails a batch get; it shows up as a per-key
//! [`Error::NotFound`] inside an otherwise successful [`BatchResult`]. Only a
//! transport or pipeline failure fails the call as a whole.
//!
//! Batch sets report at batch granularity: once the pipeline round trip
//! succeeds, every entry is considered written.

use shardcache_domain::error::{Error, Result};
use shardcache_domain::ports::ShardClient;
use shardcache_domain::value_objects::{BatchResult, CacheKey, Expiry};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// Runs pipelined batch operations against a shard client
#[derive(Debug, Clone)]
pub struct BatchExecutor {
    shard: Arc<dyn ShardClient>,
}

impl BatchExecutor {
    /// Create an executor over a shared shard client
    pub fn new(shard: Arc<dyn ShardClient>) -> Self {
        Self { shard }
    }

    /// Validate and de-duplicate batch keys, keeping first-seen order
    pub fn prepare_keys<I, K>(keys: I) -> Result<Vec<String>>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut prepared = Vec::new();
        for key in keys {
            let key = key.as_ref();
            CacheKey::validate(key)?;
            if seen.insert(key.to_string()) {
                prepared.push(key.to_string());
            }
        }
        if prepared.is_empty() {
            return Err(Error::empty_input("keys is empty"));
        }
        Ok(prepared)
    }

    /// Validate batch entries; a repeated key keeps its last value
    pub fn prepare_entries<I, K, V>(entries: I) -> Result<Vec<(String, Vec<u8>)>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<[u8]>,
    {
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut prepared: Vec<(String, Vec<u8>)> = Vec::new();
        for (key, value) in entries {
            let key = key.as_ref();
            CacheKey::validate(key)?;
            let value = value.as_ref().to_vec();
            match index.get(key) {
                Some(&slot) => prepared[slot].1 = value,
                None => {
                    index.insert(key.to_string(), prepared.len());
                    prepared.push((key.to_string(), value));
                }
            }
        }
        if prepared.is_empty() {
            return Err(Error::empty_input("entries is empty"));
        }
        Ok(prepared)
    }

    /// Fetch prepared keys in one pipelined round trip
    pub async fn get(&self, keys: &[String]) -> Result<BatchResult> {
        if keys.is_empty() {
            return Err(Error::empty_input("keys is empty"));
        }
        debug!(keys = keys.len(), "cache: pipelined get");

        let outcomes = self.shard.pipeline_get(keys).await?;
        if outcomes.len() != keys.len() {
            return Err(Error::transport(format!(
                "pipeline returned {} replies for {} keys",
                outcomes.len(),
                keys.len()
            )));
        }

        let mut result = BatchResult::with_capacity(keys.len());
        for (key, outcome) in keys.iter().zip(outcomes) {
            result.insert(key.clone(), outcome);
        }
        Ok(result)
    }

    /// Store prepared entries in one pipelined round trip
    pub async fn set(&self, entries: &[(String, Vec<u8>)], expiry: Expiry) -> Result<()> {
        if entries.is_empty() {
            return Err(Error::empty_input("entries is empty"));
        }
        debug!(entries = entries.len(), "cache: pipelined set");
        self.shard.pipeline_set(entries, expiry).await
    }
}

/// Decode every key of a batch in caller order
///
/// Stops at the first key whose outcome is an error or whose payload fails
/// to decode, returning [`Error::PartialBatchDecode`] for that key. Keys
/// after it are not decoded.
pub fn decode_in_order<T, F>(
    keys: &[String],
    mut result: BatchResult,
    mut decode: F,
) -> Result<HashMap<String, T>>
where
    F: FnMut(&str, Vec<u8>) -> Result<T>,
{
    let mut decoded = HashMap::with_capacity(keys.len());
    for key in keys {
        let outcome = result
            .take(key)
            .unwrap_or_else(|| Err(Error::not_found(key.clone())));
        let value = outcome
            .and_then(|bytes| decode(key, bytes))
            .map_err(|e| Error::partial_batch_decode(key.clone(), e))?;
        decoded.insert(key.clone(), value);
    }
    Ok(decoded)
}
