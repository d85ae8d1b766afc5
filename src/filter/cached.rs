//! Cached Filter and Map
//!
//! Wrappers that memoize object filtering and mapping in a [`DerivedCache`].
//! The operation key identifies the filter (or mapper); the content key is
//! the truncated content digest of the item. Both digests keep value kinds
//! apart, so a cached answer is always the one an uncached call would give.
//! Items or filters that cannot be digested are computed without touching
//! the cache.

use tracing::{debug, trace, warn};

use crate::cache::{CacheStats, DerivedCache};
use crate::config::Config;
use crate::error::Result;
use crate::filter::{map_object, matches_filter, FilterOptions};
use crate::structural::{content_digest, content_key};
use crate::value::{Object, Value};

fn derived_cache<V>(config: &Config) -> Result<DerivedCache<V>> {
    config.validate()?;
    DerivedCache::new(config.derived_cache_size)?.with_eviction_fraction(config.eviction_fraction())
}

/// Digest of a whole object, `None` (with a warning) when it has none.
fn object_key(object: &Object, what: &str, hasher: fn(&Value) -> Result<String>) -> Option<String> {
    match hasher(&object.clone().into_value()) {
        Ok(key) => Some(key),
        Err(err) => {
            warn!(error = %err, "{} is unhashable, bypassing cache", what);
            None
        }
    }
}

// == Cached Filter ==
/// Object filter whose per-item verdicts are cached.
#[derive(Debug)]
pub struct CachedFilter {
    options: FilterOptions,
    cache: DerivedCache<bool>,
}

impl CachedFilter {
    /// # Errors
    /// `StructError::Configuration` if `max_cache_size` is zero.
    pub fn new(max_cache_size: usize, options: FilterOptions) -> Result<Self> {
        Ok(Self {
            options,
            cache: DerivedCache::new(max_cache_size)?,
        })
    }

    /// Builds a filter sized and swept according to `config`.
    pub fn from_config(config: &Config, options: FilterOptions) -> Result<Self> {
        Ok(Self {
            options,
            cache: derived_cache(config)?,
        })
    }

    pub fn options(&self) -> &FilterOptions {
        &self.options
    }

    /// Whether `item` satisfies `filter`.
    pub async fn matches(&mut self, item: &Value, filter: &Object) -> bool {
        let op_key = self.filter_key(filter);
        self.lookup(op_key.as_deref(), item, filter)
    }

    /// Items that satisfy `filter`, in their original order.
    pub async fn filter(&mut self, items: &[Value], filter: &Object) -> Vec<Value> {
        let op_key = self.filter_key(filter);
        let mut kept = Vec::new();
        for item in items {
            if self.lookup(op_key.as_deref(), item, filter) {
                kept.push(item.clone());
            }
        }
        kept
    }

    /// Operation key for `filter`, `None` when its verdicts must not be cached.
    ///
    /// Strict mode compares list, map and instance values by node, which a
    /// content digest cannot capture.
    fn filter_key(&self, filter: &Object) -> Option<String> {
        if !self.options.use_deep_equal {
            let by_node = filter
                .iter()
                .any(|(_, value)| value.node_id().is_some());
            if by_node {
                debug!("strict filter compares nodes, bypassing cache");
                return None;
            }
        }
        object_key(filter, "filter", content_digest)
    }

    fn lookup(&mut self, op_key: Option<&str>, item: &Value, filter: &Object) -> bool {
        let Some(op_key) = op_key else {
            return matches_filter(item, filter, &self.options);
        };
        let item_key = match content_key(item) {
            Ok(key) => key,
            Err(err) => {
                warn!(error = %err, "item has no content key, bypassing cache");
                return matches_filter(item, filter, &self.options);
            }
        };

        if let Some(&verdict) = self.cache.get(op_key, &item_key) {
            trace!(item = %item_key, "filter cache hit");
            return verdict;
        }
        let verdict = matches_filter(item, filter, &self.options);
        self.cache.insert(op_key, &item_key, verdict);
        verdict
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }
}

// == Cached Map ==
/// [`map_object`] with results cached per input object.
///
/// Cached results are shallow copies: the returned map is new, but the values
/// it holds are shared with the cache.
pub struct CachedMap<F> {
    mapper: F,
    op_key: String,
    cache: DerivedCache<Object>,
}

impl<F> CachedMap<F>
where
    F: Fn(&str, &Value) -> Value,
{
    /// Caches under the mapper's type name. Closures have distinct types, so
    /// two maps share cached results only when they share the closure.
    pub fn new(mapper: F, max_cache_size: usize) -> Result<Self> {
        Self::with_key(std::any::type_name::<F>(), mapper, max_cache_size)
    }

    /// Caches under an explicit operation key.
    pub fn with_key(key: impl Into<String>, mapper: F, max_cache_size: usize) -> Result<Self> {
        Ok(Self {
            mapper,
            op_key: key.into(),
            cache: DerivedCache::new(max_cache_size)?,
        })
    }

    pub fn from_config(mapper: F, config: &Config) -> Result<Self> {
        Ok(Self {
            mapper,
            op_key: std::any::type_name::<F>().to_string(),
            cache: derived_cache(config)?,
        })
    }

    pub fn op_key(&self) -> &str {
        &self.op_key
    }

    /// Maps every safe entry of `obj`, reusing a cached result when `obj`
    /// has the content key of a previous input.
    pub async fn map(&mut self, obj: &Object) -> Object {
        let Some(item_key) = object_key(obj, "object", content_key) else {
            return map_object(obj, &self.mapper);
        };

        if let Some(cached) = self.cache.get(&self.op_key, &item_key) {
            trace!(item = %item_key, "map cache hit");
            return cached.clone();
        }
        let mapped = map_object(obj, &self.mapper);
        self.cache.insert(&self.op_key, &item_key, mapped.clone());
        mapped
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
