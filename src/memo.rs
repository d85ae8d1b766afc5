//! Memoization Module
//!
//! Wraps a pure function so repeated calls with equal arguments are served
//! from a [`BoundedCache`].

use std::cell::RefCell;

use serde::Serialize;
use tracing::{trace, warn};

use crate::cache::{BoundedCache, CacheStats};
use crate::config::Config;
use crate::error::Result;

/// Cache size used when none is configured.
pub const DEFAULT_MEMO_CACHE_SIZE: usize = 1000;

/// Produces a cache key, or `None` to bypass the cache for this call.
type KeyFn<A> = Box<dyn Fn(&A) -> Option<String>>;

// == Memoized ==
/// A function together with the cache of its results.
///
/// Arguments are keyed by their `serde_json` serialization unless a key
/// function is supplied. Serialization is order-sensitive for maps built with
/// different insertion orders, so logically equal arguments may miss.
pub struct Memoized<A, R> {
    func: Box<dyn Fn(&A) -> R>,
    key_fn: KeyFn<A>,
    cache: RefCell<BoundedCache<String, R>>,
}

/// Memoizes `f` with a cache of `max_cache_size` results.
///
/// # Errors
/// `StructError::Configuration` if `max_cache_size` is zero.
pub fn memoize<A, R, F>(f: F, max_cache_size: usize) -> Result<Memoized<A, R>>
where
    A: Serialize + 'static,
    R: Clone,
    F: Fn(&A) -> R + 'static,
{
    Ok(Memoized {
        func: Box::new(f),
        key_fn: Box::new(serialized_key),
        cache: RefCell::new(BoundedCache::new(max_cache_size)?),
    })
}

/// Memoizes `f`, keying calls with `key_fn` instead of serialization.
pub fn memoize_with_key<A, R, F, K>(f: F, key_fn: K, max_cache_size: usize) -> Result<Memoized<A, R>>
where
    R: Clone,
    A: 'static,
    F: Fn(&A) -> R + 'static,
    K: Fn(&A) -> String + 'static,
{
    Ok(Memoized {
        func: Box::new(f),
        key_fn: Box::new(move |args: &A| Some(key_fn(args))),
        cache: RefCell::new(BoundedCache::new(max_cache_size)?),
    })
}

/// Order-sensitive JSON text of the arguments.
fn serialized_key<A: Serialize>(args: &A) -> Option<String> {
    match serde_json::to_string(args) {
        Ok(key) => Some(key),
        Err(err) => {
            warn!(error = %err, "memo arguments are not serializable, bypassing cache");
            None
        }
    }
}

impl<A, R: Clone> Memoized<A, R> {
    /// Memoizes `f` with the configured `MEMO_CACHE_SIZE`.
    pub fn from_config<F>(f: F, config: &Config) -> Result<Self>
    where
        A: Serialize + 'static,
        F: Fn(&A) -> R + 'static,
    {
        config.validate()?;
        memoize(f, config.memo_cache_size)
    }

    // == Call ==
    /// Returns the cached result for `args`, computing and storing it on a
    /// miss. The cache is not borrowed while the function runs.
    pub fn call(&self, args: &A) -> R {
        let Some(key) = (self.key_fn)(args) else {
            return (self.func)(args);
        };

        let cached = self.cache.borrow_mut().get(&key).cloned();
        if let Some(result) = cached {
            trace!(key = %key, "memo hit");
            return result;
        }

        let result = (self.func)(args);
        self.cache.borrow_mut().set(key, result.clone());
        result
    }

    pub fn cache_len(&self) -> usize {
        self.cache.borrow().len()
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.borrow().stats()
    }

    pub fn clear(&self) {
        self.cache.borrow_mut().clear();
    }
}
