//! Cache Statistics Module
//!
//! Counters shared by [`BoundedCache`](super::BoundedCache) and
//! [`DerivedCache`](super::DerivedCache). An LRU eviction is a sweep that
//! removes one entry; a derived-cache sweep removes a slice of a bucket.

use serde::Serialize;

// == Cache Stats ==
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that had to compute (or found nothing)
    pub misses: u64,
    /// Entries removed by eviction, summed over all sweeps
    pub evictions: u64,
    /// Eviction passes; each removes at least one entry
    pub sweeps: u64,
    /// Entries held when the snapshot was taken
    pub total_entries: usize,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// hits / (hits + misses), 0.0 before the first lookup.
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            0.0
        } else {
            self.hits as f64 / lookups as f64
        }
    }

    /// Mean entries removed per sweep. Always 1.0 for an LRU cache that
    /// has evicted; larger for derived caches with big buckets.
    pub fn evictions_per_sweep(&self) -> f64 {
        if self.sweeps == 0 {
            0.0
        } else {
            self.evictions as f64 / self.sweeps as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    // == Record Sweep ==
    /// One eviction pass that removed `removed` entries.
    pub fn record_sweep(&mut self, removed: usize) {
        if removed == 0 {
            return;
        }
        self.sweeps += 1;
        self.evictions += removed as u64;
    }

    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}
