//! Integration Tests for the Public API
//!
//! Exercises caches, memoization and the structural engine through the
//! crate root, the way a consumer of the library would.

use std::cell::Cell;
use std::rc::Rc;

use serde_json::json;
use structkit::{
    deep_clone, deep_equal, deep_merge, diff, flatten, get_path, hash, is_safe_path, memoize,
    set_path, unflatten, BoundedCache, CachedFilter, CachedMap, FilterOptions, Object,
    StructError, Value,
};

// == Helper Functions ==

fn object(json: serde_json::Value) -> Object {
    match Value::from(json) {
        Value::Map(object) => object.borrow().clone(),
        other => panic!("expected an object, got {:?}", other),
    }
}

fn self_referencing() -> Value {
    let value = Value::from(json!({"name": "loop"}));
    if let Value::Map(object) = &value {
        object.borrow_mut().insert("me", value.clone());
    }
    value
}

// == Bounded Cache ==

#[test]
fn test_lru_evicts_oldest_untouched_key() {
    let mut cache = BoundedCache::new(2).unwrap();
    cache.set("a", 1);
    cache.set("b", 2);
    cache.get("a");
    cache.set("c", 3);

    assert_eq!(cache.get("b"), None);
    assert_eq!(cache.keys().copied().collect::<Vec<_>>(), vec!["a", "c"]);
    assert_eq!(cache.stats().evictions, 1);
}

#[test]
fn test_lru_update_keeps_size() {
    let mut cache = BoundedCache::new(2).unwrap();
    cache.set("a", 1);
    cache.set("b", 2);
    cache.set("a", 10);

    assert_eq!(cache.len(), 2);
    assert_eq!(cache.get("a"), Some(&10));
}

#[test]
fn test_zero_capacity_rejected() {
    assert!(matches!(
        BoundedCache::<String, u8>::new(0),
        Err(StructError::Configuration(_))
    ));
}

// == Memoization ==

#[test]
fn test_memoized_function_runs_once() {
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    let add = memoize(
        move |&(a, b): &(i32, i32)| {
            counter.set(counter.get() + 1);
            a + b
        },
        10,
    )
    .unwrap();

    assert_eq!(add.call(&(1, 2)), 3);
    assert_eq!(add.call(&(1, 2)), 3);
    assert_eq!(calls.get(), 1);
}

// == Equality and Hash ==

#[test]
fn test_equal_documents_hash_equally() {
    let a = Value::from(json!({"x": [1, {"y": null}], "z": "s"}));
    let b = Value::from(json!({"z": "s", "x": [1, {"y": null}]}));
    let c = Value::from(json!({"z": "s", "x": [{"y": null}, 1]}));

    assert!(deep_equal(&a, &b));
    assert!(!deep_equal(&a, &c));
    assert_eq!(hash(&a).unwrap(), hash(&b).unwrap());
    assert_ne!(hash(&a).unwrap(), hash(&c).unwrap());
}

#[test]
fn test_nan_equals_itself() {
    assert!(deep_equal(&Value::Number(f64::NAN), &Value::Number(f64::NAN)));
}

#[test]
fn test_hash_of_cycle_is_unhashable() {
    assert!(matches!(
        hash(&self_referencing()),
        Err(StructError::Unhashable(_))
    ));
}

#[test]
fn test_cyclic_structures_compare_without_overflow() {
    let a = self_referencing();
    let b = self_referencing();
    assert!(deep_equal(&a, &b));
}

// == Clone and Merge ==

#[test]
fn test_clone_drops_prototype_keys() {
    let value = Value::parse_json(r#"{"__proto__": {"admin": true}, "safe": {"n": 1}}"#).unwrap();

    let copy = deep_clone(&value).unwrap();

    let copied = copy.as_map().unwrap().borrow();
    assert!(!copied.contains_key("__proto__"));
    assert!(copied.get("safe").unwrap().as_map().is_some());
    assert!(!copied.get("safe").unwrap().same_node(
        value.as_map().unwrap().borrow().get("safe").unwrap()
    ));
}

#[test]
fn test_clone_of_cycle_fails() {
    assert!(matches!(
        deep_clone(&self_referencing()),
        Err(StructError::CircularReference(_))
    ));
}

#[test]
fn test_merge_is_pollution_safe() {
    let target = object(json!({"tags": ["a"], "cfg": {"x": 1}}));
    let source = Value::parse_json(r#"{"tags": ["b"], "cfg": {"y": 2}, "__proto__": {"admin": true}}"#)
        .unwrap();
    let source = source.as_map().unwrap().borrow().clone();

    let merged = deep_merge(&target, &source).unwrap();

    assert_eq!(merged, object(json!({"tags": ["a", "b"], "cfg": {"x": 1, "y": 2}})));
    assert_eq!(target, object(json!({"tags": ["a"], "cfg": {"x": 1}})));
}

#[test]
fn test_merge_result_does_not_alias_inputs() {
    let target = object(json!({"keep": {"x": 1}}));
    let source = object(json!({"other": 2}));

    let merged = deep_merge(&target, &source).unwrap().into_value();
    set_path(&merged, "keep.x", Value::from(999)).unwrap();

    assert_eq!(target, object(json!({"keep": {"x": 1}})));
    assert_eq!(get_path(&merged, "keep.x"), Some(Value::from(999)));
}

// == Flatten, Diff and Paths ==

#[test]
fn test_flatten_unflatten_round_trip() {
    let nested = object(json!({"a": {"b": {"c": 1}}, "list": [1, 2], "empty": {}}));

    let flat = flatten(&nested, ".").unwrap();

    assert_eq!(flat, object(json!({"a.b.c": 1, "list": [1, 2]})));
    assert_eq!(
        unflatten(&flat, "."),
        object(json!({"a": {"b": {"c": 1}}, "list": [1, 2]}))
    );
}

#[test]
fn test_unflatten_refuses_proto_paths() {
    let flat = object(json!({"__proto__.polluted": true, "a.__proto__": 1, "ok.key": 2}));

    let nested = unflatten(&flat, ".");

    assert_eq!(nested, object(json!({"ok": {"key": 2}})));
}

#[test]
fn test_diff_example() {
    let result = diff(
        &object(json!({"a": 1, "b": 2, "c": 3})),
        &object(json!({"b": 99, "c": 3, "d": 4})),
    )
    .unwrap();

    assert_eq!(result.added, object(json!({"d": 4})));
    assert_eq!(result.removed, object(json!({"a": 1})));
    assert_eq!(result.changed.keys().collect::<Vec<_>>(), vec!["b"]);
    assert_eq!(result.changed["b"].from, Value::from(2));
    assert_eq!(result.changed["b"].to, Value::from(99));
}

#[test]
fn test_paths() {
    let doc = Value::from(json!({"user": {"roles": ["admin"]}}));

    set_path(&doc, "user.profile.name", Value::from("Ada")).unwrap();

    assert_eq!(get_path(&doc, "user.profile.name"), Some(Value::from("Ada")));
    assert_eq!(get_path(&doc, "user.roles.0"), Some(Value::from("admin")));
    assert!(!is_safe_path("user..roles", "."));
    assert!(matches!(
        set_path(&doc, "__proto__.admin", Value::from(true)),
        Err(StructError::InvalidPath(_))
    ));
}

// == Cached Wrappers ==

#[tokio::test]
async fn test_cached_filter_bypasses_cache_for_cyclic_items() {
    let mut filter = CachedFilter::new(10, FilterOptions::default()).unwrap();
    let items = vec![self_referencing(), Value::from(json!({"name": "other"}))];

    let kept = filter.filter(&items, &object(json!({"name": "loop"}))).await;

    assert_eq!(kept.len(), 1);
    assert!(kept[0].same_node(&items[0]));
    assert_eq!(filter.cache_len(), 1);
}

#[test]
fn test_cached_map_with_block_on() {
    let mut mapper = CachedMap::with_key(
        "stringify",
        |_: &str, v: &Value| Value::from(format!("{:?}", v)),
        4,
    )
    .unwrap();

    let mapped = tokio_test::block_on(mapper.map(&object(json!({"n": 1, "s": "x"}))));

    assert_eq!(mapped, object(json!({"n": "1", "s": "\"x\""})));
    assert_eq!(mapper.cache_len(), 1);
}
