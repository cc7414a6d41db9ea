//! Shared test doubles for the application layer

use async_trait::async_trait;
use shardcache_domain::error::{Error, Result};
use shardcache_domain::ports::ShardClient;
use shardcache_domain::value_objects::Expiry;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// In-memory shard client that counts every call it receives
#[derive(Debug, Default)]
pub struct CountingShardClient {
    store: Mutex<HashMap<String, Vec<u8>>>,
    calls: AtomicUsize,
    pipeline_calls: AtomicUsize,
    fail_transport: AtomicBool,
    always_hit: AtomicBool,
}

impl CountingShardClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every get returns a value, whether or not it was stored
    pub fn always_hit() -> Self {
        let client = Self::default();
        client.always_hit.store(true, Ordering::SeqCst);
        client
    }

    pub fn set_fail_transport(&self, fail: bool) {
        self.fail_transport.store(fail, Ordering::SeqCst);
    }

    pub fn insert(&self, key: &str, value: &[u8]) {
        self.store
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_vec());
    }

    pub fn stored(&self, key: &str) -> Option<Vec<u8>> {
        self.store.lock().unwrap().get(key).cloned()
    }

    /// Total calls of any kind
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn pipeline_calls(&self) -> usize {
        self.pipeline_calls.load(Ordering::SeqCst)
    }

    fn enter(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_transport.load(Ordering::SeqCst) {
            return Err(Error::transport("connection refused"));
        }
        Ok(())
    }

    fn lookup(&self, key: &str) -> Result<Vec<u8>> {
        if self.always_hit.load(Ordering::SeqCst) {
            return Ok(b"hit".to_vec());
        }
        self.store
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| Error::not_found(key))
    }
}

#[async_trait]
impl ShardClient for CountingShardClient {
    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        self.enter()?;
        self.lookup(key)
    }

    async fn set(&self, key: &str, value: &[u8], _expiry: Expiry) -> Result<()> {
        self.enter()?;
        self.insert(key, value);
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<u64> {
        self.enter()?;
        Ok(u64::from(self.store.lock().unwrap().remove(key).is_some()))
    }

    async fn exists(&self, key: &str) -> Result<u64> {
        self.enter()?;
        Ok(u64::from(self.store.lock().unwrap().contains_key(key)))
    }

    async fn pipeline_get(&self, keys: &[String]) -> Result<Vec<Result<Vec<u8>>>> {
        self.pipeline_calls.fetch_add(1, Ordering::SeqCst);
        self.enter()?;
        Ok(keys.iter().map(|k| self.lookup(k)).collect())
    }

    async fn pipeline_set(&self, entries: &[(String, Vec<u8>)], _expiry: Expiry) -> Result<()> {
        self.pipeline_calls.fetch_add(1, Ordering::SeqCst);
        self.enter()?;
        for (key, value) in entries {
            self.insert(key, value);
        }
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        self.enter()
    }

    fn provider_name(&self) -> &str {
        "counting"
    }
}
