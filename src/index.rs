//! Index Module
//!
//! In-memory map from key to the byte offset of its latest record in the
//! active segment. Offsets into sealed segments are never stored here; the
//! index is cleared on every rotation.

use std::collections::HashMap;

/// Key → offset map for the active segment
#[derive(Debug, Default, Clone)]
pub struct Index {
    entries: HashMap<Vec<u8>, u64>,
}

impl Index {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Offset of the latest record for `key`
    pub fn get(&self, key: &[u8]) -> Option<u64> {
        self.entries.get(key).copied()
    }

    /// Point `key` at `offset`, returning the offset it replaced
    pub fn insert(&mut self, key: Vec<u8>, offset: u64) -> Option<u64> {
        self.entries.insert(key, offset)
    }

    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every mapping (after rotation)
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Iterate over (key, offset) pairs in arbitrary order
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], u64)> {
        self.entries.iter().map(|(k, &off)| (k.as_slice(), off))
    }
}
