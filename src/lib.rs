//! structkit - bounded caches and structural object algorithms
//!
//! Provides an LRU cache, a memoizer, a derived-computation cache, and deep
//! equality, hashing, cloning, merging, flattening, diffing and filtering of
//! nested values, with defenses against prototype-pollution keys.

pub mod cache;
pub mod config;
pub mod error;
pub mod filter;
pub mod memo;
pub mod security;
pub mod structural;
pub mod value;

pub use cache::{BoundedCache, CacheStats, DerivedCache};
pub use config::Config;
pub use error::{Result, StructError};
pub use filter::{map_object, matches_filter, CachedFilter, CachedMap, FilterOptions};
pub use memo::{memoize, memoize_with_key, Memoized, DEFAULT_MEMO_CACHE_SIZE};
pub use security::{is_dangerous_key, is_safe_key, is_safe_path};
pub use structural::{
    deep_clone, deep_equal, deep_merge, diff, flatten, get_path, hash, set_path, unflatten,
    ObjectDiff,
};
pub use value::{Object, Value};
