//! Consistent hash ring over shard names
//!
//! Each live shard owns [`RING_VNODES_PER_SHARD`] virtual nodes. A key maps
//! to the first virtual node at or after its hash, wrapping around, so
//! removing one shard only moves the keys that shard owned.

use seahash::hash;
use shardcache_domain::constants::RING_VNODES_PER_SHARD;
use std::collections::BTreeMap;

/// Consistent hash ring keyed by shard name
#[derive(Debug, Clone)]
pub struct HashRing {
    vnodes: BTreeMap<u64, String>,
    vnodes_per_shard: usize,
    shards: Vec<String>,
}

impl Default for HashRing {
    fn default() -> Self {
        Self::new()
    }
}

impl HashRing {
    /// Create an empty ring with the default virtual node count
    pub fn new() -> Self {
        Self::with_vnodes(RING_VNODES_PER_SHARD)
    }

    /// Create an empty ring with a custom virtual node count
    pub fn with_vnodes(vnodes_per_shard: usize) -> Self {
        Self {
            vnodes: BTreeMap::new(),
            vnodes_per_shard: vnodes_per_shard.max(1),
            shards: Vec::new(),
        }
    }

    /// Number of shards on the ring
    pub fn len(&self) -> usize {
        self.shards.len()
    }

    /// True when no shard is on the ring
    pub fn is_empty(&self) -> bool {
        self.shards.is_empty()
    }

    /// Shard names on the ring, sorted
    pub fn shards(&self) -> &[String] {
        &self.shards
    }

    /// True when `name` is on the ring
    pub fn contains(&self, name: &str) -> bool {
        self.shards.iter().any(|s| s == name)
    }

    /// Put a shard on the ring; returns false if it was already there
    pub fn add(&mut self, name: &str) -> bool {
        if self.contains(name) {
            return false;
        }
        self.shards.push(name.to_string());
        self.shards.sort();

        for i in 0..self.vnodes_per_shard {
            self.vnodes.insert(Self::vnode_hash(name, i), name.to_string());
        }
        true
    }

    /// Take a shard off the ring; returns false if it was not there
    pub fn remove(&mut self, name: &str) -> bool {
        if !self.contains(name) {
            return false;
        }
        self.shards.retain(|s| s != name);

        for i in 0..self.vnodes_per_shard {
            let slot = Self::vnode_hash(name, i);
            // Another shard may have won a colliding slot
            if self.vnodes.get(&slot).is_some_and(|owner| owner == name) {
                self.vnodes.remove(&slot);
            }
        }
        true
    }

    /// Shard owning `key`, `None` when the ring is empty
    pub fn get(&self, key: &str) -> Option<&str> {
        let point = hash(key.as_bytes());
        self.vnodes
            .range(point..)
            .next()
            .or_else(|| self.vnodes.iter().next())
            .map(|(_, name)| name.as_str())
    }

    fn vnode_hash(name: &str, index: usize) -> u64 {
        hash(format!("{name}-{index}").as_bytes())
    }
}
