//! Flatten / Unflatten Module
//!
//! Converts between nested maps and single-level maps keyed by joined paths.

use std::collections::HashSet;
use std::rc::Rc;

use tracing::warn;

use super::clone::copy_value;
use crate::error::{Result, StructError};
use crate::security::is_dangerous_key;
use crate::value::{shared, Object, Shared, Value};

/// Default path separator.
pub const DEFAULT_SEPARATOR: &str = ".";

// == Flatten ==
/// Flattens nested plain maps into `separator`-joined keys.
///
/// Every plain map is traversed, so an empty map contributes no key. Lists,
/// dates and every other non-map value are leaves. Leaf lists are copied,
/// never shared with `object`.
///
/// # Errors
/// `StructError::CircularReference` if a map or leaf contains itself.
pub fn flatten(object: &Object, separator: &str) -> Result<Object> {
    let mut out = Object::new();
    let mut ancestors = HashSet::new();
    flatten_into(object, "", separator, &mut out, &mut ancestors)?;
    Ok(out)
}

fn flatten_into(
    object: &Object,
    prefix: &str,
    separator: &str,
    out: &mut Object,
    ancestors: &mut HashSet<usize>,
) -> Result<()> {
    for (key, value) in object.iter() {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}{}{}", prefix, separator, key)
        };
        match value {
            Value::Map(nested) => {
                let id = Rc::as_ptr(nested) as usize;
                if !ancestors.insert(id) {
                    return Err(StructError::CircularReference(path));
                }
                flatten_into(&nested.borrow(), &path, separator, out, ancestors)?;
                ancestors.remove(&id);
            }
            _ => {
                let leaf = copy_value(value, &path)?;
                out.insert(path, leaf);
            }
        }
    }
    Ok(())
}

// == Unflatten ==
/// Rebuilds nested maps from `separator`-joined keys.
///
/// Keys with an empty or dangerous segment are skipped. When a key needs a
/// map where a non-map value already sits, the map replaces it. Values are
/// copied in, so the result shares no list or map node with `flat`; a value
/// that cannot be copied (it contains itself) is skipped.
pub fn unflatten(flat: &Object, separator: &str) -> Object {
    let mut root = Object::new();
    for (key, value) in flat.iter() {
        let segments: Vec<&str> = if separator.is_empty() {
            vec![key.as_str()]
        } else {
            key.split(separator).collect()
        };
        if segments
            .iter()
            .any(|segment| segment.is_empty() || is_dangerous_key(segment))
        {
            warn!(key = %key, "skipping unsafe flattened key");
            continue;
        }
        match copy_value(value, key) {
            Ok(copy) => insert_at(&mut root, &segments, copy),
            Err(err) => warn!(key = %key, error = %err, "skipping uncopyable flattened value"),
        }
    }
    root
}

fn insert_at(object: &mut Object, segments: &[&str], value: Value) {
    let Some((first, rest)) = segments.split_first() else {
        return;
    };
    if rest.is_empty() {
        object.insert(*first, value);
        return;
    }
    let child = child_map(object, first);
    insert_at(&mut child.borrow_mut(), rest, value);
}

/// Map under `key`, replacing whatever non-map value sits there. Every map
/// in the tree being built is either new or a copy, so writing into it is safe.
fn child_map(object: &mut Object, key: &str) -> Shared<Object> {
    if let Some(Value::Map(node)) = object.get(key) {
        return Rc::clone(node);
    }
    let node = shared(Object::new());
    object.insert(key, Value::Map(Rc::clone(&node)));
    node
}
