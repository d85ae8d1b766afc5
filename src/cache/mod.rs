//! Cache Module
//!
//! Provides the ordered linked map, the strict-LRU bounded cache and the
//! percentage-sweep derived cache.

mod bounded;
mod derived;
mod entry;
mod linked_map;
mod stats;


// Re-export public types
pub use bounded::BoundedCache;
pub use derived::{DerivedCache, DEFAULT_EVICTION_FRACTION};
pub use entry::CacheEntry;
pub use linked_map::{Iter, LinkedMap};
pub use stats::CacheStats;
