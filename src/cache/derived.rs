//! Derived Cache Module
//!
//! Two-level cache for derived computations: an outer bucket per operation
//! key, an inner insertion-ordered map per content hash. Eviction is a coarse
//! percentage sweep of the largest bucket rather than strict LRU.

use std::collections::HashMap;

use tracing::debug;

use crate::cache::{CacheStats, LinkedMap};
use crate::error::{Result, StructError};

/// Share of the largest bucket removed by one sweep.
pub const DEFAULT_EVICTION_FRACTION: f64 = 0.2;

// == Derived Cache ==
#[derive(Debug, Clone)]
pub struct DerivedCache<V> {
    /// Operation key to bucket of content-hash results
    buckets: HashMap<String, LinkedMap<String, V>>,
    /// Entries across all buckets
    total: usize,
    /// Sweep threshold
    max_cache_size: usize,
    eviction_fraction: f64,
    stats: CacheStats,
}

impl<V> DerivedCache<V> {
    // == Constructor ==
    /// Creates a cache holding about `max_cache_size` entries in total.
    ///
    /// # Errors
    /// `StructError::Configuration` if `max_cache_size` is zero.
    pub fn new(max_cache_size: usize) -> Result<Self> {
        if max_cache_size < 1 {
            return Err(StructError::Configuration(format!(
                "max cache size must be at least 1, got {}",
                max_cache_size
            )));
        }
        Ok(Self {
            buckets: HashMap::new(),
            total: 0,
            max_cache_size,
            eviction_fraction: DEFAULT_EVICTION_FRACTION,
            stats: CacheStats::new(),
        })
    }

    /// Overrides the sweep share, which must lie in `(0, 1]`.
    pub fn with_eviction_fraction(mut self, fraction: f64) -> Result<Self> {
        if !(fraction > 0.0 && fraction <= 1.0) {
            return Err(StructError::Configuration(format!(
                "eviction fraction must be within (0, 1], got {}",
                fraction
            )));
        }
        self.eviction_fraction = fraction;
        Ok(self)
    }

    // == Get ==
    /// Looks up a result. Reads never reorder a bucket.
    pub fn get(&mut self, op_key: &str, content_key: &str) -> Option<&V> {
        let found = self
            .buckets
            .get(op_key)
            .and_then(|bucket| bucket.get(content_key));
        if found.is_some() {
            self.stats.record_hit();
        } else {
            self.stats.record_miss();
        }
        found
    }

    // == Insert ==
    /// Stores a result, sweeping once if the total now exceeds the maximum.
    pub fn insert(&mut self, op_key: &str, content_key: &str, value: V) {
        let bucket = self.buckets.entry(op_key.to_string()).or_default();
        if bucket.insert(content_key.to_string(), value).is_none() {
            self.total += 1;
        }
        if self.total > self.max_cache_size {
            self.sweep();
        }
    }

    // == Sweep ==
    /// Removes the oldest slice of the largest bucket.
    fn sweep(&mut self) {
        let Some((op_key, bucket)) = self
            .buckets
            .iter_mut()
            .max_by_key(|(_, bucket)| bucket.len())
        else {
            return;
        };

        let slice = ((bucket.len() as f64 * self.eviction_fraction).ceil() as usize)
            .max(1)
            .min(bucket.len());
        for _ in 0..slice {
            bucket.pop_front();
        }
        self.total -= slice;
        self.stats.record_sweep(slice);
        debug!(
            bucket = %op_key,
            removed = slice,
            remaining = self.total,
            "swept derived cache bucket"
        );

        if bucket.is_empty() {
            let op_key = op_key.clone();
            self.buckets.remove(&op_key);
        }
    }

    // == Length ==
    /// Entries across all buckets.
    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Number of live operation buckets.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Entries held for one operation key.
    pub fn bucket_len(&self, op_key: &str) -> usize {
        self.buckets.get(op_key).map_or(0, LinkedMap::len)
    }

    pub fn max_cache_size(&self) -> usize {
        self.max_cache_size
    }

    // == Clear ==
    pub fn clear(&mut self) {
        self.buckets.clear();
        self.total = 0;
    }

    // == Stats ==
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.total);
        stats
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_rejects_zero_size() {
        assert!(matches!(
            DerivedCache::<bool>::new(0),
            Err(StructError::Configuration(_))
        ));
        assert!(DerivedCache::<bool>::new(1)
            .unwrap()
            .with_eviction_fraction(0.0)
            .is_err());
    }

    #[test]
    fn test_derived_get_and_insert() {
        let mut cache = DerivedCache::new(10).unwrap();

        cache.insert("op", "h1", true);
        cache.insert("op", "h2", false);
        cache.insert("other", "h1", false);

        assert_eq!(cache.get("op", "h1"), Some(&true));
        assert_eq!(cache.get("other", "h1"), Some(&false));
        assert_eq!(cache.get("missing", "h1"), None);
        assert_eq!(cache.len(), 3);
        assert_eq!(cache.bucket_count(), 2);

        let stats = cache.stats();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_derived_overwrite_does_not_grow() {
        let mut cache = DerivedCache::new(10).unwrap();

        cache.insert("op", "h1", true);
        cache.insert("op", "h1", false);

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("op", "h1"), Some(&false));
    }

    #[test]
    fn test_derived_sweeps_oldest_slice_of_largest_bucket() {
        let mut cache = DerivedCache::new(10).unwrap();

        for i in 0..8 {
            cache.insert("big", &format!("h{}", i), i);
        }
        cache.insert("small", "s0", 100);
        cache.insert("small", "s1", 101);
        // 10 entries: at the limit, no sweep yet
        assert_eq!(cache.len(), 10);

        // Reading h0 does not protect it: sweeps follow insertion order
        assert_eq!(cache.get("big", "h0"), Some(&0));

        cache.insert("small", "s2", 102);

        // 20% of 8 rounds up to 2: h0 and h1 removed
        assert_eq!(cache.len(), 9);
        assert_eq!(cache.bucket_len("big"), 6);
        assert_eq!(cache.get("big", "h0"), None);
        assert_eq!(cache.get("big", "h1"), None);
        assert_eq!(cache.get("big", "h2"), Some(&2));
        assert_eq!(cache.bucket_len("small"), 3);
        assert_eq!(cache.stats().evictions, 2);
        assert_eq!(cache.stats().sweeps, 1);
    }

    #[test]
    fn test_derived_sweep_removes_at_least_one() {
        let mut cache = DerivedCache::new(1).unwrap();

        cache.insert("op", "a", 1);
        cache.insert("op", "b", 2);

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("op", "a"), None);
        assert_eq!(cache.get("op", "b"), Some(&2));
    }

    #[test]
    fn test_derived_drops_emptied_bucket() {
        let mut cache = DerivedCache::new(1).unwrap().with_eviction_fraction(1.0).unwrap();

        cache.insert("op", "a", 1);
        cache.insert("op", "b", 2);

        assert!(cache.is_empty());
        assert_eq!(cache.bucket_count(), 0);
    }

    #[test]
    fn test_derived_clear() {
        let mut cache = DerivedCache::new(5).unwrap();

        cache.insert("op", "a", 1);
        cache.clear();

        assert!(cache.is_empty());
        assert_eq!(cache.get("op", "a"), None);
    }
}
