//! Filter Module
//!
//! Object filtering and key-preserving mapping, plus their cached wrappers.

mod cached;
mod object_filter;
mod object_map;

pub use cached::{CachedFilter, CachedMap};
pub use object_filter::{matches_filter, FilterOptions};
pub use object_map::map_object;
