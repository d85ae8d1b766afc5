//! Dot-path access into nested values.
//!
//! `get_path` is a pure read. `set_path` is the one mutating operation of the
//! structural engine: it writes into the nodes reachable from its target.

use crate::error::{Result, StructError};
use crate::security::is_safe_path;
use crate::value::{shared, Object, Value};

/// Separator for dot-notation paths.
pub const PATH_SEPARATOR: char = '.';

// == Get Path ==
/// Reads the value at a dot path. Maps are indexed by key, lists by number.
///
/// Returns `None` for unsafe paths and for paths that do not resolve. A key
/// that is present with an `undefined` value resolves to `Value::Undefined`.
pub fn get_path(value: &Value, path: &str) -> Option<Value> {
    if !is_safe_path(path, ".") {
        return None;
    }
    resolve(value, path.split(PATH_SEPARATOR))
}

/// Walks `segments` without validating them.
pub(crate) fn resolve<'a>(value: &Value, segments: impl Iterator<Item = &'a str>) -> Option<Value> {
    let mut current = value.clone();
    for segment in segments {
        let next = match &current {
            Value::Map(object) => object.borrow().get(segment).cloned(),
            Value::List(items) => segment
                .parse::<usize>()
                .ok()
                .and_then(|i| items.borrow().get(i).cloned()),
            _ => None,
        }?;
        current = next;
    }
    Some(current)
}

// == Set Path ==
/// Writes `value` at a dot path inside `target`, mutating it in place.
///
/// Missing intermediate maps are created and non-container intermediates are
/// replaced by maps. A list segment must be an index no greater than the
/// list length; writing at the length appends.
///
/// # Errors
/// `StructError::InvalidPath` for unsafe paths, a non-container target, or
/// an out-of-range list index.
pub fn set_path(target: &Value, path: &str, value: Value) -> Result<()> {
    if !is_safe_path(path, ".") {
        return Err(StructError::InvalidPath(format!("unsafe path '{}'", path)));
    }
    let segments: Vec<&str> = path.split(PATH_SEPARATOR).collect();
    let Some((last, parents)) = segments.split_last() else {
        return Err(StructError::InvalidPath("empty path".to_string()));
    };

    let mut current = target.clone();
    for segment in parents {
        current = descend(&current, segment, path)?;
    }
    assign(&current, last, value, path)
}

/// Returns the container under `segment`, creating a map where needed.
fn descend(node: &Value, segment: &str, path: &str) -> Result<Value> {
    match node {
        Value::Map(object) => {
            let mut object = object.borrow_mut();
            match object.get(segment) {
                Some(child @ (Value::Map(_) | Value::List(_))) => Ok(child.clone()),
                _ => {
                    let child = Value::Map(shared(Object::new()));
                    object.insert(segment, child.clone());
                    Ok(child)
                }
            }
        }
        Value::List(items) => {
            let index = list_index(segment, path)?;
            let mut items = items.borrow_mut();
            match items.get(index) {
                Some(child @ (Value::Map(_) | Value::List(_))) => Ok(child.clone()),
                Some(_) => {
                    let child = Value::map(Object::new());
                    items[index] = child.clone();
                    Ok(child)
                }
                None if index == items.len() => {
                    let child = Value::map(Object::new());
                    items.push(child.clone());
                    Ok(child)
                }
                None => Err(out_of_range(index, items.len(), path)),
            }
        }
        other => Err(StructError::InvalidPath(format!(
            "cannot write into {} along '{}'",
            other.type_name(),
            path
        ))),
    }
}

fn assign(node: &Value, key: &str, value: Value, path: &str) -> Result<()> {
    match node {
        Value::Map(object) => {
            object.borrow_mut().insert(key, value);
            Ok(())
        }
        Value::List(items) => {
            let index = list_index(key, path)?;
            let mut items = items.borrow_mut();
            if index < items.len() {
                items[index] = value;
            } else if index == items.len() {
                items.push(value);
            } else {
                return Err(out_of_range(index, items.len(), path));
            }
            Ok(())
        }
        other => Err(StructError::InvalidPath(format!(
            "cannot write into {} along '{}'",
            other.type_name(),
            path
        ))),
    }
}

fn list_index(segment: &str, path: &str) -> Result<usize> {
    segment.parse().map_err(|_| {
        StructError::InvalidPath(format!("'{}' is not a list index in '{}'", segment, path))
    })
}

fn out_of_range(index: usize, len: usize, path: &str) -> StructError {
    StructError::InvalidPath(format!(
        "index {} out of range for list of length {} in '{}'",
        index, len, path
    ))
}
