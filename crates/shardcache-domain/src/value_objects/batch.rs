//! Batch get results

use crate::error::Result;
use std::collections::HashMap;

/// Per-key outcomes of one pipelined get
///
/// A successful batch can still hold per-key failures: a missing key shows
/// up here as [`Error::NotFound`](crate::Error::NotFound) instead of failing the whole call.
#[derive(Debug, Default)]
pub struct BatchResult {
    entries: HashMap<String, Result<Vec<u8>>>,
}

impl BatchResult {
    /// Create an empty result sized for `capacity` keys
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
        }
    }

    /// Record the outcome for one key
    pub fn insert<S: Into<String>>(&mut self, key: S, outcome: Result<Vec<u8>>) {
        self.entries.insert(key.into(), outcome);
    }

    /// Outcome for a key, `None` if the key was not part of the batch
    pub fn get(&self, key: &str) -> Option<&Result<Vec<u8>>> {
        self.entries.get(key)
    }

    /// Remove and return the outcome for a key
    pub fn take(&mut self, key: &str) -> Option<Result<Vec<u8>>> {
        self.entries.remove(key)
    }

    /// Number of keys in the batch
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the batch holds no keys
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of keys that produced a value
    pub fn hit_count(&self) -> usize {
        self.entries.values().filter(|o| o.is_ok()).count()
    }

    /// Number of keys that produced a per-key error
    pub fn miss_count(&self) -> usize {
        self.len() - self.hit_count()
    }

    /// Iterate over `(key, outcome)` pairs in arbitrary order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Result<Vec<u8>>)> {
        self.entries.iter()
    }

    /// Consume the result, returning the underlying map
    pub fn into_inner(self) -> HashMap<String, Result<Vec<u8>>> {
        self.entries
    }
}

impl IntoIterator for BatchResult {
    type Item = (String, Result<Vec<u8>>);
    type IntoIter = std::collections::hash_map::IntoIter<String, Result<Vec<u8>>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl FromIterator<(String, Result<Vec<u8>>)> for BatchResult {
    fn from_iter<I: IntoIterator<Item = (String, Result<Vec<u8>>)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
