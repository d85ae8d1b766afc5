//! Diff Module
//!
//! Key-level comparison of two maps using canonical serialization.

use std::collections::BTreeMap;

use crate::error::Result;
use crate::value::{to_canonical_string, Object, Value};

// == Change ==
/// Old and new value of a key present on both sides.
#[derive(Debug, Clone, PartialEq)]
pub struct Change {
    pub from: Value,
    pub to: Value,
}

// == Object Diff ==
/// Disjoint groups of keys that differ between two maps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectDiff {
    /// Keys only in `after`
    pub added: Object,
    /// Keys only in `before`
    pub removed: Object,
    /// Keys in both whose serializations differ
    pub changed: BTreeMap<String, Change>,
}

impl ObjectDiff {
    /// True when nothing was added, removed or changed.
    pub fn is_empty(&self) -> bool {
        self.added.len() == 0 && self.removed.len() == 0 && self.changed.is_empty()
    }

    /// Renders the diff as `{added, removed, changed: {key: {from, to}}}`.
    pub fn to_value(&self) -> Value {
        let changed: Object = self
            .changed
            .iter()
            .map(|(key, change)| {
                let mut pair = Object::new();
                pair.insert("from", change.from.clone());
                pair.insert("to", change.to.clone());
                (key.clone(), pair)
            })
            .collect();

        let mut out = Object::new();
        out.insert("added", self.added.clone());
        out.insert("removed", self.removed.clone());
        out.insert("changed", changed);
        out.into_value()
    }
}

// == Diff ==
/// Compares the string keys of `before` and `after`.
///
/// Values are compared by canonical serialization, not by
/// [`deep_equal`](crate::structural::deep_equal): `undefined` and functions
/// serialize to nothing and therefore compare equal to each other.
///
/// # Errors
/// `StructError::CircularReference` or `StructError::Unhashable` when a value
/// cannot be serialized.
pub fn diff(before: &Object, after: &Object) -> Result<ObjectDiff> {
    let mut result = ObjectDiff::default();

    for (key, old) in before.iter() {
        match after.get(key) {
            None => {
                result.removed.insert(key.clone(), old.clone());
            }
            Some(new) => {
                if to_canonical_string(old)? != to_canonical_string(new)? {
                    result.changed.insert(
                        key.clone(),
                        Change {
                            from: old.clone(),
                            to: new.clone(),
                        },
                    );
                }
            }
        }
    }

    for (key, new) in after.iter() {
        if !before.contains_key(key) {
            result.added.insert(key.clone(), new.clone());
        }
    }

    Ok(result)
}
