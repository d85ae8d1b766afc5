//! Deep Clone Module

use std::collections::HashSet;

use tracing::debug;

use crate::error::{Result, StructError};
use crate::security::is_dangerous_key;
use crate::value::{child_path, index_path, Object, Value};

// == Deep Clone ==
/// Copies a value into fresh nodes.
///
/// Dangerous keys (`__proto__`, `constructor`, `prototype`, `__*`) are
/// dropped from every map.
///
/// # Errors
/// - `StructError::CircularReference` if a node is reachable from itself
/// - `StructError::UnsupportedType` for functions, symbols, regexps and
///   class instances
pub fn deep_clone(value: &Value) -> Result<Value> {
    Cloner::default().clone_value(value, "")
}

/// Copies lists and maps into fresh nodes like [`deep_clone`], but passes
/// values it cannot clone (functions, symbols, regexps, instances) through
/// as the same handle.
///
/// Used where a result must not share mutable containers with its inputs.
pub(crate) fn copy_value(value: &Value, path: &str) -> Result<Value> {
    let mut cloner = Cloner {
        pass_through_opaque: true,
        ..Cloner::default()
    };
    cloner.clone_value(value, path)
}

#[derive(Default)]
struct Cloner {
    /// Nodes currently being copied
    in_progress: HashSet<usize>,
    /// Reuse uncloneable values instead of failing
    pass_through_opaque: bool,
}

impl Cloner {
    fn clone_value(&mut self, value: &Value, path: &str) -> Result<Value> {
        match value {
            Value::Undefined
            | Value::Null
            | Value::Bool(_)
            | Value::Number(_)
            | Value::BigInt(_)
            | Value::String(_)
            | Value::Date(_) => Ok(value.clone()),
            Value::List(items) => {
                let id = self.enter(value, path)?;
                let items = items.borrow();
                let mut copy = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    copy.push(self.clone_value(item, &index_path(path, i))?);
                }
                self.in_progress.remove(&id);
                Ok(Value::list(copy))
            }
            Value::Map(object) => {
                let id = self.enter(value, path)?;
                let copy = self.clone_object(&object.borrow(), path)?;
                self.in_progress.remove(&id);
                Ok(Value::map(copy))
            }
            Value::Symbol(_) | Value::Function(_) | Value::RegExp(_) | Value::Instance(_)
                if self.pass_through_opaque =>
            {
                Ok(value.clone())
            }
            Value::Instance(instance) => Err(StructError::UnsupportedType(format!(
                "cannot clone instance of {} at {}",
                instance.class,
                StructError::location(path)
            ))),
            Value::Symbol(_) | Value::Function(_) | Value::RegExp(_) => {
                Err(StructError::UnsupportedType(format!(
                    "cannot clone {} at {}",
                    value.type_name(),
                    StructError::location(path)
                )))
            }
        }
    }

    fn clone_object(&mut self, object: &Object, path: &str) -> Result<Object> {
        let mut copy = Object::new();
        for (key, item) in object.iter() {
            if is_dangerous_key(key) {
                debug!(key = %key, "dropping dangerous key while cloning");
                continue;
            }
            copy.insert(key.clone(), self.clone_value(item, &child_path(path, key))?);
        }
        for (symbol, item) in object.symbol_entries() {
            let at = child_path(path, &format!("[{:?}]", symbol));
            copy.insert_symbol(symbol.clone(), self.clone_value(item, &at)?);
        }
        Ok(copy)
    }

    fn enter(&mut self, value: &Value, path: &str) -> Result<usize> {
        let id = value.node_id().unwrap_or_default();
        if !self.in_progress.insert(id) {
            return Err(StructError::CircularReference(StructError::location(path)));
        }
        Ok(id)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Symbol;
    use chrono::Utc;
    use serde_json::json;

    #[test]
    fn test_clone_is_equal_but_independent() {
        let original = Value::from(json!({"a": {"b": [1, 2, {"c": 3}]}}));
        let copy = deep_clone(&original).unwrap();

        assert_eq!(copy, original);
        assert!(!copy.same_node(&original));

        // Mutate a nested field of the clone
        let nested = copy.as_map().unwrap().borrow().get("a").cloned().unwrap();
        nested.as_map().unwrap().borrow_mut().insert("b", "changed");

        let original_b = original.as_map().unwrap().borrow().get("a").cloned().unwrap();
        let b = original_b.as_map().unwrap().borrow().get("b").cloned().unwrap();
        assert_eq!(b, Value::from(json!([1, 2, {"c": 3}])));
    }

    #[test]
    fn test_clone_drops_dangerous_keys() {
        let original = Value::parse_json(
            r#"{"__proto__":{"polluted":true},"constructor":1,"__meta":2,"safe":3}"#,
        )
        .unwrap();
        let copy = deep_clone(&original).unwrap();
        let object = copy.as_map().unwrap().borrow();

        assert_eq!(object.keys().collect::<Vec<_>>(), vec!["safe"]);
        // A fresh object is unaffected
        assert!(Object::new().get("polluted").is_none());
    }

    #[test]
    fn test_clone_keeps_dates_and_symbol_keys() {
        let now = Utc::now();
        let sym = Symbol::new("tag");
        let mut object = Object::new();
        object.insert("at", now);
        object.insert_symbol(sym.clone(), Value::from(json!([1])));

        let copy = deep_clone(&Value::map(object)).unwrap();
        let copy = copy.as_map().unwrap().borrow();

        assert_eq!(copy.get("at"), Some(&Value::Date(now)));
        assert_eq!(copy.get_symbol(&sym), Some(&Value::from(json!([1]))));
    }

    #[test]
    fn test_clone_rejects_cycles() {
        let node = Value::list(vec![Value::from(1)]);
        if let Value::List(items) = &node {
            items.borrow_mut().push(node.clone());
        }

        let err = deep_clone(&node).unwrap_err();
        assert!(matches!(err, StructError::CircularReference(ref at) if at == "[1]"));
    }

    #[test]
    fn test_clone_allows_shared_children() {
        let child = Value::from(json!({"x": 1}));
        let parent = Value::list(vec![child.clone(), child]);

        let copy = deep_clone(&parent).unwrap();
        assert_eq!(copy, parent);
    }

    #[test]
    fn test_clone_rejects_unsupported_types() {
        let mut object = Object::new();
        object.insert("f", Value::function("handler"));
        let err = deep_clone(&Value::map(object)).unwrap_err();
        assert!(matches!(err, StructError::UnsupportedType(ref msg) if msg.contains("at f")));

        assert!(deep_clone(&Value::Symbol(Symbol::new("s"))).is_err());
        assert!(deep_clone(&Value::regexp("x", "")).is_err());
        assert!(deep_clone(&Value::instance("Point", Object::new())).is_err());
    }

    #[test]
    fn test_copy_value_passes_opaque_values_through() {
        let handler = Value::function("handler");
        let point = Value::instance("Point", Object::new());
        let mut object = Object::new();
        object.insert("f", handler.clone());
        object.insert("p", point.clone());
        object.insert("list", Value::from(json!([1, {"x": 2}])));
        let original = Value::map(object);

        let copy = copy_value(&original, "").unwrap();

        let copied = copy.as_map().unwrap().borrow();
        assert_eq!(copied.get("f"), Some(&handler));
        assert!(copied.get("p").unwrap().same_node(&point));
        let list = original.as_map().unwrap().borrow().get("list").cloned().unwrap();
        assert!(!copied.get("list").unwrap().same_node(&list));
        assert_eq!(copied.get("list"), Some(&list));
    }

    #[test]
    fn test_copy_value_still_rejects_cycles() {
        let node = Value::map(Object::new());
        if let Value::Map(object) = &node {
            object.borrow_mut().insert("me", node.clone());
        }
        assert!(matches!(
            copy_value(&node, "root"),
            Err(StructError::CircularReference(_))
        ));
    }
}
