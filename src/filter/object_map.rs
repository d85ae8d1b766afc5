//! Key-preserving transformation of a map's values.

use tracing::debug;

use crate::security::is_dangerous_key;
use crate::value::{Object, Value};

/// Applies `mapper` to every own string-keyed entry of `obj`.
///
/// Dangerous keys are left out of the result. Symbol-keyed entries are not
/// visited.
pub fn map_object<F>(obj: &Object, mapper: F) -> Object
where
    F: Fn(&str, &Value) -> Value,
{
    let mut out = Object::new();
    for (key, value) in obj.iter() {
        if is_dangerous_key(key) {
            debug!(key = %key, "skipping dangerous key while mapping");
            continue;
        }
        out.insert(key.clone(), mapper(key, value));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_map_values() {
        let input = Value::from(json!({"a": 1, "b": 2}));
        let object = input.as_map().unwrap().borrow();

        let doubled = map_object(&object, |_, v| Value::from(v.as_f64().unwrap_or(0.0) * 2.0));

        assert_eq!(doubled, *Value::from(json!({"a": 2, "b": 4})).as_map().unwrap().borrow());
    }

    #[test]
    fn test_mapper_sees_keys() {
        let input = Value::from(json!({"x": null}));
        let object = input.as_map().unwrap().borrow();

        let named = map_object(&object, |k, _| Value::from(k.to_uppercase()));

        assert_eq!(named.get("x"), Some(&Value::from("X")));
    }

    #[test]
    fn test_skips_dangerous_keys() {
        let input = Value::parse_json(r#"{"__proto__": 1, "constructor": 2, "ok": 3}"#).unwrap();
        let object = input.as_map().unwrap().borrow();

        let mapped = map_object(&object, |_, v| v.clone());

        assert_eq!(mapped.keys().collect::<Vec<_>>(), vec!["ok"]);
    }
}
