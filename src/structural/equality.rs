//! Structural Equality Module
//!
//! Deep, short-circuiting equivalence over [`Value`]s.

use std::collections::HashSet;

use crate::value::{Object, Value};

// == Deep Equal ==
/// Decides whether two values are deeply equivalent.
///
/// Lists compare in order, maps ignore key order, NaN equals NaN, dates
/// compare by epoch millisecond and regexps by source and flags. Functions
/// and symbols are only equal to themselves.
pub fn deep_equal(a: &Value, b: &Value) -> bool {
    Comparer::default().equal(a, b)
}

/// Identity comparison in the manner of `===`.
///
/// Primitives compare by value (NaN is unequal to itself); lists, maps and
/// instances compare by node. Dates and regexps have no node identity here,
/// so they compare by value.
pub fn strict_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => x == y,
        (Value::BigInt(x), Value::BigInt(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Symbol(x), Value::Symbol(y)) => x == y,
        (Value::Function(x), Value::Function(y)) => x == y,
        (Value::Date(x), Value::Date(y)) => x.timestamp_millis() == y.timestamp_millis(),
        (Value::RegExp(x), Value::RegExp(y)) => x == y,
        _ => a.same_node(b),
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        Comparer::default().objects_equal(self, other)
    }
}

#[derive(Default)]
struct Comparer {
    /// Node pairs currently being compared; revisiting one means a cycle
    in_progress: HashSet<(usize, usize)>,
}

impl Comparer {
    fn equal(&mut self, a: &Value, b: &Value) -> bool {
        match (a, b) {
            (Value::Number(x), Value::Number(y)) => x == y || (x.is_nan() && y.is_nan()),
            (Value::List(x), Value::List(y)) => self.nodes(a, b, |this| {
                let (x, y) = (x.borrow(), y.borrow());
                x.len() == y.len() && x.iter().zip(y.iter()).all(|(l, r)| this.equal(l, r))
            }),
            (Value::Map(x), Value::Map(y)) => {
                self.nodes(a, b, |this| this.objects_equal(&x.borrow(), &y.borrow()))
            }
            (Value::Instance(x), Value::Instance(y)) => {
                x.class == y.class
                    && self.nodes(a, b, |this| {
                        this.objects_equal(&x.fields.borrow(), &y.fields.borrow())
                    })
            }
            _ => strict_equal(a, b),
        }
    }

    fn objects_equal(&mut self, x: &Object, y: &Object) -> bool {
        if x.len() != y.len() || x.symbol_entries().len() != y.symbol_entries().len() {
            return false;
        }
        let strings_match = x.iter().all(|(key, left)| match y.get(key) {
            Some(right) => self.equal(left, right),
            None => false,
        });
        strings_match
            && x.symbol_entries()
                .iter()
                .all(|(symbol, left)| match y.get_symbol(symbol) {
                    Some(right) => self.equal(left, right),
                    None => false,
                })
    }

    /// Runs `compare` for two nodes unless they are the same node or the
    /// pair is already under comparison further up.
    fn nodes(&mut self, a: &Value, b: &Value, compare: impl FnOnce(&mut Self) -> bool) -> bool {
        if a.same_node(b) {
            return true;
        }
        let pair = (a.node_id().unwrap_or_default(), b.node_id().unwrap_or_default());
        if !self.in_progress.insert(pair) {
            return true;
        }
        let result = compare(self);
        self.in_progress.remove(&pair);
        result
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Symbol;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn v(json: serde_json::Value) -> Value {
        Value::from(json)
    }

    #[test]
    fn test_primitives() {
        assert!(deep_equal(&Value::from(1), &Value::from(1.0)));
        assert!(deep_equal(&Value::from("a"), &Value::from("a")));
        assert!(!deep_equal(&Value::from("a"), &Value::from("b")));
        assert!(!deep_equal(&Value::from(1), &Value::from("1")));
        assert!(!deep_equal(&Value::from(1), &Value::BigInt(1)));
    }

    #[test]
    fn test_nan_is_self_equal() {
        let nan = Value::Number(f64::NAN);
        assert!(deep_equal(&nan, &Value::Number(f64::NAN)));
        assert!(!strict_equal(&nan, &nan));
    }

    #[test]
    fn test_null_and_undefined() {
        assert!(deep_equal(&Value::Null, &Value::Null));
        assert!(deep_equal(&Value::Undefined, &Value::Undefined));
        assert!(!deep_equal(&Value::Null, &Value::Undefined));
        assert!(!deep_equal(&Value::Null, &v(json!({}))));
        assert!(!deep_equal(&Value::Null, &Value::from(0)));
    }

    #[test]
    fn test_category_mismatch() {
        assert!(!deep_equal(&v(json!([])), &v(json!({}))));
        assert!(!deep_equal(&v(json!({"0": 1})), &v(json!([1]))));
    }

    #[test]
    fn test_dates_and_regexps() {
        let a = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let b = Utc.timestamp_millis_opt(1_700_000_000_001).unwrap();
        assert!(deep_equal(&Value::from(a), &Value::from(a)));
        assert!(!deep_equal(&Value::from(a), &Value::from(b)));

        assert!(deep_equal(&Value::regexp("a+", "g"), &Value::regexp("a+", "g")));
        assert!(!deep_equal(&Value::regexp("a+", "g"), &Value::regexp("a+", "i")));
    }

    #[test]
    fn test_lists_are_order_sensitive() {
        assert!(deep_equal(&v(json!([1, [2, 3]])), &v(json!([1, [2, 3]]))));
        assert!(!deep_equal(&v(json!([1, 2])), &v(json!([2, 1]))));
        assert!(!deep_equal(&v(json!([1, 2])), &v(json!([1, 2, 3]))));
    }

    #[test]
    fn test_maps_ignore_key_order() {
        let a = Value::parse_json(r#"{"a":1,"b":{"c":[1,2]}}"#).unwrap();
        let b = Value::parse_json(r#"{"b":{"c":[1,2]},"a":1}"#).unwrap();
        assert!(deep_equal(&a, &b));
        assert!(!deep_equal(&a, &v(json!({"a": 1}))));
        assert!(!deep_equal(&v(json!({"a": 1})), &v(json!({"b": 1}))));
    }

    #[test]
    fn test_symbol_keys_by_identity() {
        let sym = Symbol::new("id");
        let other = Symbol::new("id");

        let mut a = Object::new();
        a.insert_symbol(sym.clone(), 1);
        let mut b = Object::new();
        b.insert_symbol(sym.clone(), 1);
        let mut c = Object::new();
        c.insert_symbol(other, 1);

        assert!(deep_equal(&Value::map(a.clone()), &Value::map(b)));
        assert!(!deep_equal(&Value::map(a), &Value::map(c)));
    }

    #[test]
    fn test_functions_by_identity() {
        let f = Value::function("f");
        assert!(deep_equal(&f, &f.clone()));
        assert!(!deep_equal(&f, &Value::function("f")));
    }

    #[test]
    fn test_instances_need_same_class() {
        let fields: Object = [("x", 1)].into_iter().collect();
        let a = Value::instance("Point", fields.clone());
        let b = Value::instance("Point", fields.clone());
        let c = Value::instance("Vector", fields);

        assert!(deep_equal(&a, &b));
        assert!(!deep_equal(&a, &c));
    }

    #[test]
    fn test_symmetry() {
        let pairs = [
            (v(json!({"a": [1, 2]})), v(json!({"a": [1, 2]}))),
            (v(json!({"a": 1})), v(json!({"a": 1, "b": 2}))),
            (v(json!([null])), v(json!([]))),
        ];
        for (a, b) in pairs {
            assert_eq!(deep_equal(&a, &b), deep_equal(&b, &a));
        }
    }

    #[test]
    fn test_cyclic_structures_terminate() {
        let make = || {
            let node = Value::map(Object::new());
            if let Value::Map(object) = &node {
                object.borrow_mut().insert("self", node.clone());
                object.borrow_mut().insert("n", 1);
            }
            node
        };
        let a = make();
        let b = make();

        assert!(deep_equal(&a, &a));
        assert!(deep_equal(&a, &b));
    }

    #[test]
    fn test_object_partial_eq() {
        let a: Object = [("x", 1), ("y", 2)].into_iter().collect();
        let b: Object = [("y", 2), ("x", 1)].into_iter().collect();
        assert_eq!(a, b);
    }
}
