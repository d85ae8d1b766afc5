//! JSON conversions and the canonical serialization.
//!
//! The canonical form follows JSON serialization rules so that it can be
//! hashed and compared as text: `undefined`, functions and symbols vanish
//! from maps and become `null` in lists; non-finite numbers become `null`;
//! dates become ISO-8601 strings; regexps become `{}`. Map keys come out
//! sorted.

use std::collections::HashSet;

use chrono::SecondsFormat;
use serde_json::{Map, Number, Value as Json};

use super::{child_path, index_path, Object, Value};
use crate::error::{Result, StructError};

/// Largest integer an `f64` represents exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

impl From<Json> for Value {
    fn from(json: Json) -> Self {
        match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            Json::String(s) => Value::String(s),
            Json::Array(items) => Value::list(items.into_iter().map(Value::from).collect()),
            Json::Object(fields) => {
                let object: Object = fields.into_iter().collect();
                Value::map(object)
            }
        }
    }
}

// == Canonical Serialization ==
/// Serializes a value to its canonical JSON form.
///
/// Returns `Ok(None)` when the value has no JSON form at the top level
/// (`undefined`, a function or a symbol).
///
/// # Errors
/// - `StructError::CircularReference` if a node contains itself
/// - `StructError::Unhashable` for BigInt values
pub fn to_json(value: &Value) -> Result<Option<Json>> {
    Serializer::default().serialize(value, "")
}

/// Canonical JSON text of a value, `None` when it has no JSON form.
pub fn to_canonical_string(value: &Value) -> Result<Option<String>> {
    match to_json(value)? {
        Some(json) => Ok(Some(serde_json::to_string(&json)?)),
        None => Ok(None),
    }
}

// == Tagged Serialization ==
/// Kind-preserving variant of the canonical text, used for cache keys.
///
/// Two values get the same tagged text only if they are deeply equal.
/// `undefined`, non-finite numbers, BigInts, dates, regexps and instances
/// are wrapped in `{"$kind": ...}` markers, and plain map keys starting with
/// `$` are escaped with a second `$` so they cannot mimic a marker.
///
/// # Errors
/// - `StructError::CircularReference` if a node contains itself
/// - `StructError::Unhashable` for functions, symbols and symbol-keyed
///   entries, whose equality is identity
pub(crate) fn to_tagged_string(value: &Value) -> Result<String> {
    let mut serializer = Serializer {
        tagged: true,
        ..Serializer::default()
    };
    let json = serializer.serialize(value, "")?.unwrap_or(Json::Null);
    Ok(serde_json::to_string(&json)?)
}

fn marker(kind: &str, content: Json) -> Json {
    let mut out = Map::new();
    out.insert(format!("${}", kind), content);
    Json::Object(out)
}

#[derive(Default)]
struct Serializer {
    /// Nodes on the current path from the root
    ancestors: HashSet<usize>,
    /// Keep every kind distinguishable instead of following JSON rules
    tagged: bool,
}

impl Serializer {
    fn serialize(&mut self, value: &Value, path: &str) -> Result<Option<Json>> {
        let json = match value {
            Value::Function(_) | Value::Symbol(_) if self.tagged => {
                return Err(StructError::Unhashable(format!(
                    "{} at {} is only equal to itself",
                    value.type_name(),
                    StructError::location(path)
                )))
            }
            Value::Undefined if self.tagged => marker("undefined", Json::Null),
            Value::Undefined | Value::Function(_) | Value::Symbol(_) => return Ok(None),
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Number(n) if self.tagged && !n.is_finite() => {
                marker("number", Json::String(n.to_string()))
            }
            Value::Number(n) => number_to_json(*n),
            Value::BigInt(n) if self.tagged => marker("bigint", Json::String(n.to_string())),
            Value::BigInt(_) => {
                return Err(StructError::Unhashable(format!(
                    "BigInt at {} has no JSON form",
                    StructError::location(path)
                )))
            }
            Value::String(s) => Json::String(s.clone()),
            Value::Date(d) => {
                let text = Json::String(d.to_rfc3339_opts(SecondsFormat::Millis, true));
                if self.tagged {
                    marker("date", text)
                } else {
                    text
                }
            }
            Value::RegExp(r) if self.tagged => marker("regexp", Json::String(r.to_string())),
            Value::RegExp(_) => Json::Object(Map::new()),
            Value::List(items) => {
                let id = self.enter(value, path)?;
                let items = items.borrow();
                let mut out = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    let json = self.serialize(item, &index_path(path, i))?;
                    out.push(json.unwrap_or(Json::Null));
                }
                self.ancestors.remove(&id);
                Json::Array(out)
            }
            Value::Map(object) => {
                let id = self.enter(value, path)?;
                let json = self.fields(&object.borrow(), path)?;
                self.ancestors.remove(&id);
                json
            }
            Value::Instance(instance) => {
                let id = self.enter(value, path)?;
                let fields = self.fields(&instance.fields.borrow(), path)?;
                self.ancestors.remove(&id);
                if self.tagged {
                    let mut out = Map::new();
                    out.insert("$instance".to_string(), Json::String(instance.class.to_string()));
                    out.insert("$fields".to_string(), fields);
                    Json::Object(out)
                } else {
                    fields
                }
            }
        };
        Ok(Some(json))
    }

    fn fields(&mut self, object: &Object, path: &str) -> Result<Json> {
        if self.tagged && !object.symbol_entries().is_empty() {
            return Err(StructError::Unhashable(format!(
                "symbol keys at {} are only equal to themselves",
                StructError::location(path)
            )));
        }
        let mut out = Map::new();
        for (key, item) in object.iter() {
            if let Some(json) = self.serialize(item, &child_path(path, key))? {
                let key = if self.tagged && key.starts_with('$') {
                    format!("${}", key)
                } else {
                    key.clone()
                };
                out.insert(key, json);
            }
        }
        Ok(Json::Object(out))
    }

    fn enter(&mut self, value: &Value, path: &str) -> Result<usize> {
        let id = value.node_id().unwrap_or_default();
        if !self.ancestors.insert(id) {
            return Err(StructError::CircularReference(StructError::location(path)));
        }
        Ok(id)
    }
}

/// Serializes through the canonical form. Values without a JSON form
/// serialize as `None`; cycles and BigInts are serializer errors.
impl serde::Serialize for Value {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match to_json(self) {
            Ok(Some(json)) => serde::Serialize::serialize(&json, serializer),
            Ok(None) => serializer.serialize_none(),
            Err(err) => Err(serde::ser::Error::custom(err)),
        }
    }
}

fn number_to_json(n: f64) -> Json {
    if !n.is_finite() {
        return Json::Null;
    }
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        return Json::Number(Number::from(n as i64));
    }
    Number::from_f64(n).map_or(Json::Null, Json::Number)
}
