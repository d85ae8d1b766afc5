//! Object Filter
//!
//! Matches items against a filter object whose keys may be dot paths. The
//! filter fails closed: anything it cannot evaluate is a non-match.

use crate::security::is_safe_path;
use crate::structural::{deep_equal, resolve, strict_equal, PATH_SEPARATOR};
use crate::value::{Object, Value};

/// Nesting limit for sub-filters; deeper filters never match.
const MAX_FILTER_DEPTH: usize = 64;

/// How filter values are compared against item values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterOptions {
    /// Compare strings ignoring case
    pub case_insensitive_strings: bool,
    /// Structural equality and sub-filters for nested maps; identity otherwise
    pub use_deep_equal: bool,
    /// Reject filter keys that are not safe paths
    pub validate_paths: bool,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            case_insensitive_strings: false,
            use_deep_equal: true,
            validate_paths: true,
        }
    }
}

// == Matches Filter ==
/// True when `item` satisfies every entry of `filter`.
///
/// An empty filter matches everything. A non-map item matches only the empty
/// filter.
pub fn matches_filter(item: &Value, filter: &Object, options: &FilterOptions) -> bool {
    matches_at_depth(item, filter, options, 0)
}

fn matches_at_depth(item: &Value, filter: &Object, options: &FilterOptions, depth: usize) -> bool {
    if filter.len() == 0 {
        return true;
    }
    if depth > MAX_FILTER_DEPTH || !matches!(item, Value::Map(_)) {
        return false;
    }

    filter.iter().all(|(path, expected)| {
        if options.validate_paths && !is_safe_path(path, ".") {
            return false;
        }
        match resolve(item, path.split(PATH_SEPARATOR)) {
            Some(actual) => value_matches(&actual, expected, options, depth),
            None => false,
        }
    })
}

fn value_matches(actual: &Value, expected: &Value, options: &FilterOptions, depth: usize) -> bool {
    match (actual, expected) {
        (Value::List(items), Value::List(wanted)) => {
            let (items, wanted) = (items.borrow(), wanted.borrow());
            wanted
                .iter()
                .all(|w| items.iter().any(|item| scalar_matches(item, w, options)))
        }
        (Value::List(items), _) => items
            .borrow()
            .iter()
            .any(|item| scalar_matches(item, expected, options)),
        (Value::Map(_), Value::Map(sub)) if options.use_deep_equal => {
            matches_at_depth(actual, &sub.borrow(), options, depth + 1)
        }
        _ => scalar_matches(actual, expected, options),
    }
}

fn scalar_matches(actual: &Value, expected: &Value, options: &FilterOptions) -> bool {
    if options.case_insensitive_strings {
        if let (Value::String(a), Value::String(b)) = (actual, expected) {
            return a.to_lowercase() == b.to_lowercase();
        }
    }
    if options.use_deep_equal {
        deep_equal(actual, expected)
    } else {
        strict_equal(actual, expected)
    }
}
