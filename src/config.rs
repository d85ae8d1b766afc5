//! Configuration Module
//!
//! Handles loading cache sizes and engine defaults from environment variables.

use std::env;

use crate::error::{Result, StructError};

/// Library configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum entries held by a memoized function's cache
    pub memo_cache_size: usize,
    /// Maximum entries across all buckets of a cached filter/map
    pub derived_cache_size: usize,
    /// Share of the largest bucket removed by one derived-cache sweep
    pub eviction_percent: u8,
    /// Separator used by flatten/unflatten
    pub flatten_separator: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MEMO_CACHE_SIZE` - Memoizer capacity (default: 1000)
    /// - `DERIVED_CACHE_SIZE` - Cached filter/map capacity (default: 1000)
    /// - `DERIVED_EVICTION_PERCENT` - Sweep size in percent (default: 20)
    /// - `FLATTEN_SEPARATOR` - Flatten key separator (default: ".")
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            memo_cache_size: parse_var("MEMO_CACHE_SIZE").unwrap_or(defaults.memo_cache_size),
            derived_cache_size: parse_var("DERIVED_CACHE_SIZE")
                .unwrap_or(defaults.derived_cache_size),
            eviction_percent: parse_var("DERIVED_EVICTION_PERCENT")
                .unwrap_or(defaults.eviction_percent),
            flatten_separator: env::var("FLATTEN_SEPARATOR")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.flatten_separator),
        }
    }

    // == Validate ==
    /// Rejects values no cache can be built from.
    pub fn validate(&self) -> Result<()> {
        if self.memo_cache_size < 1 {
            return Err(StructError::Configuration(
                "MEMO_CACHE_SIZE must be at least 1".to_string(),
            ));
        }
        if self.derived_cache_size < 1 {
            return Err(StructError::Configuration(
                "DERIVED_CACHE_SIZE must be at least 1".to_string(),
            ));
        }
        if !(1..=100).contains(&self.eviction_percent) {
            return Err(StructError::Configuration(format!(
                "DERIVED_EVICTION_PERCENT must be within 1..=100, got {}",
                self.eviction_percent
            )));
        }
        Ok(())
    }

    /// Eviction share as a fraction in `(0, 1]`.
    pub fn eviction_fraction(&self) -> f64 {
        f64::from(self.eviction_percent) / 100.0
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            memo_cache_size: 1000,
            derived_cache_size: 1000,
            eviction_percent: 20,
            flatten_separator: ".".to_string(),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
