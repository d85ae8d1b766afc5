//! Deep Merge Module

use std::collections::HashSet;
use std::rc::Rc;

use super::clone::copy_value;
use crate::error::{Result, StructError};
use crate::security::is_dangerous_key;
use crate::value::{child_path, Object, Value};

// == Deep Merge ==
/// Right-biased deep merge of `source` into a copy of `target`.
///
/// For each safe source key: two lists concatenate into a new list, two maps
/// merge recursively into a new map, anything else takes the source value.
/// Neither input is modified, and the result holds no list or map node of
/// either input. Dangerous keys are dropped from both sides.
///
/// # Errors
/// `StructError::CircularReference` if a copied value contains itself or the
/// same pair of maps is reached again while merging.
pub fn deep_merge(target: &Object, source: &Object) -> Result<Object> {
    Merger::default().merge(target, source, "")
}

#[derive(Default)]
struct Merger {
    /// (target node, source node) pairs on the current path
    in_progress: HashSet<(usize, usize)>,
}

impl Merger {
    fn merge(&mut self, target: &Object, source: &Object, path: &str) -> Result<Object> {
        let mut result = Object::new();
        for (key, value) in target.iter() {
            if is_dangerous_key(key) || source.contains_key(key) {
                continue;
            }
            result.insert(key.clone(), copy_value(value, &child_path(path, key))?);
        }
        for (symbol, value) in target.symbol_entries() {
            let at = child_path(path, &format!("[{:?}]", symbol));
            result.insert_symbol(symbol.clone(), copy_value(value, &at)?);
        }

        for (key, incoming) in source.iter() {
            if is_dangerous_key(key) {
                continue;
            }
            let at = child_path(path, key);
            let merged = match (target.get(key), incoming) {
                (Some(Value::List(existing)), Value::List(extra)) => {
                    let joined: Vec<Value> = existing
                        .borrow()
                        .iter()
                        .chain(extra.borrow().iter())
                        .cloned()
                        .collect();
                    copy_value(&Value::list(joined), &at)?
                }
                (Some(Value::Map(existing)), Value::Map(extra)) => {
                    let pair = (Rc::as_ptr(existing) as usize, Rc::as_ptr(extra) as usize);
                    if !self.in_progress.insert(pair) {
                        return Err(StructError::CircularReference(at));
                    }
                    let nested = self.merge(&existing.borrow(), &extra.borrow(), &at)?;
                    self.in_progress.remove(&pair);
                    Value::map(nested)
                }
                _ => copy_value(incoming, &at)?,
            };
            result.insert(key.clone(), merged);
        }
        Ok(result)
    }
}
