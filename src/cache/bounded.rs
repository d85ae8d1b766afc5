//! Bounded Cache Module
//!
//! Fixed-capacity key-value store with strict least-recently-used eviction.

use std::borrow::Borrow;
use std::fmt::Debug;
use std::hash::Hash;

use tracing::{debug, trace};

use crate::cache::{CacheStats, LinkedMap};
use crate::error::{Result, StructError};

// == Bounded Cache ==
/// LRU cache holding at most `capacity` entries.
///
/// Entry order in the underlying [`LinkedMap`] is the single source of
/// recency: every successful `get` and every `set` moves the key to the
/// back, and eviction always removes the front.
#[derive(Debug, Clone)]
pub struct BoundedCache<K, V> {
    /// Entries ordered least to most recently used
    entries: LinkedMap<K, V>,
    /// Maximum number of entries allowed
    capacity: usize,
    /// Performance statistics
    stats: CacheStats,
}

impl<K: Hash + Eq + Clone + Debug, V> BoundedCache<K, V> {
    // == Constructor ==
    /// Creates a new cache.
    ///
    /// # Errors
    /// `StructError::Configuration` if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity < 1 {
            return Err(StructError::Configuration(format!(
                "cache capacity must be at least 1, got {}",
                capacity
            )));
        }
        Ok(Self {
            entries: LinkedMap::with_capacity(capacity.min(1024)),
            capacity,
            stats: CacheStats::new(),
        })
    }

    // == Get ==
    /// Retrieves a value and marks it most recently used.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if self.entries.move_to_back(key) {
            self.stats.record_hit();
            self.entries.get(key)
        } else {
            self.stats.record_miss();
            None
        }
    }

    // == Peek ==
    /// Retrieves a value without touching recency or statistics.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key)
    }

    // == Set ==
    /// Stores a key-value pair as the most recently used entry.
    ///
    /// Overwriting keeps the size unchanged. Inserting a new key into a full
    /// cache first evicts the least recently used entry.
    pub fn set(&mut self, key: K, value: V) {
        if let Some(slot) = self.entries.get_mut(&key) {
            *slot = value;
            self.entries.move_to_back(&key);
            return;
        }

        if self.entries.len() >= self.capacity {
            if let Some((evicted, _)) = self.entries.pop_front() {
                self.stats.record_sweep(1);
                debug!(key = ?evicted, capacity = self.capacity, "evicted least recently used entry");
            }
        }

        trace!(key = ?key, "inserting cache entry");
        self.entries.insert(key, value);
        self.stats.set_total_entries(self.entries.len());
    }

    // == Remove ==
    /// Removes an entry, returning its value.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let removed = self.entries.remove(key);
        self.stats.set_total_entries(self.entries.len());
        removed
    }

    // == Contains ==
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.contains_key(key)
    }

    // == Clear ==
    /// Removes all entries. Capacity and counters are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.stats.set_total_entries(0);
    }

    // == Length ==
    /// Returns the current number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // == Capacity ==
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    // == Keys ==
    /// Keys from least to most recently used.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.keys()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }
}
