//! Value Module
//!
//! The structural value domain consumed by every algorithm in
//! [`structural`](crate::structural): primitives, dates, regexps, lists and
//! keyed maps, plus the non-plain kinds (functions, symbols, class instances)
//! that some algorithms must recognise in order to reject them.
//!
//! Lists, maps and instances are shared nodes (`Rc<RefCell<_>>`), so values
//! can alias each other and form cycles the way in-memory object graphs do.
//! Cloning a [`Value`] copies the handle, not the node; use
//! [`deep_clone`](crate::structural::deep_clone) for an independent copy.

mod json;

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use chrono::{DateTime, Utc};

pub use json::{to_canonical_string, to_json};
pub(crate) use json::to_tagged_string;

use crate::error::{Result, StructError};

/// Shared, interior-mutable node.
pub type Shared<T> = Rc<RefCell<T>>;

/// Wraps a value in a fresh [`Shared`] node.
pub fn shared<T>(value: T) -> Shared<T> {
    Rc::new(RefCell::new(value))
}

// == Symbol ==
/// Unique symbol. Two symbols are equal only if they are the same handle.
#[derive(Clone)]
pub struct Symbol(Rc<str>);

impl Symbol {
    pub fn new(description: &str) -> Self {
        Self(Rc::from(description))
    }

    pub fn description(&self) -> &str {
        &self.0
    }

    fn id(&self) -> usize {
        Rc::as_ptr(&self.0) as *const u8 as usize
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.0)
    }
}

// == RegExp ==
/// Regular expression literal, kept as pattern source and flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegExp {
    pub source: String,
    pub flags: String,
}

impl fmt::Display for RegExp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.source, self.flags)
    }
}

// == Function ==
/// Opaque callable. Equal only to itself.
#[derive(Clone)]
pub struct Function(Rc<str>);

impl Function {
    pub fn new(name: &str) -> Self {
        Self(Rc::from(name))
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

// == Instance ==
/// Object built by a class other than the plain object.
#[derive(Clone)]
pub struct Instance {
    pub class: Rc<str>,
    pub fields: Shared<Object>,
}

impl Instance {
    pub fn new(class: &str, fields: Object) -> Self {
        Self {
            class: Rc::from(class),
            fields: shared(fields),
        }
    }
}

// == Object ==
/// Keyed map with string keys (kept sorted) and symbol keys (kept in
/// insertion order).
#[derive(Debug, Clone, Default)]
pub struct Object {
    entries: BTreeMap<String, Value>,
    symbols: Vec<(Symbol, Value)>,
}

impl Object {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a string-keyed property, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.entries.get_mut(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of string-keyed properties.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when there are neither string nor symbol keys.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.symbols.is_empty()
    }

    /// String-keyed properties in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    /// Sets a symbol-keyed property, returning the previous value.
    pub fn insert_symbol(&mut self, symbol: Symbol, value: impl Into<Value>) -> Option<Value> {
        let value = value.into();
        match self.symbols.iter_mut().find(|(s, _)| *s == symbol) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.symbols.push((symbol, value));
                None
            }
        }
    }

    pub fn get_symbol(&self, symbol: &Symbol) -> Option<&Value> {
        self.symbols
            .iter()
            .find(|(s, _)| s == symbol)
            .map(|(_, v)| v)
    }

    pub fn symbol_entries(&self) -> &[(Symbol, Value)] {
        &self.symbols
    }

    /// Wraps the object in a new map node.
    pub fn into_value(self) -> Value {
        Value::Map(shared(self))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Object {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut object = Object::new();
        for (key, value) in iter {
            object.insert(key, value);
        }
        object
    }
}

// == Value ==
/// A structural value.
#[derive(Clone)]
pub enum Value {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    BigInt(i128),
    String(String),
    Symbol(Symbol),
    Date(DateTime<Utc>),
    RegExp(RegExp),
    Function(Function),
    List(Shared<Vec<Value>>),
    Map(Shared<Object>),
    Instance(Instance),
}

impl Value {
    // == Constructors ==
    /// New list node.
    pub fn list(items: Vec<Value>) -> Self {
        Value::List(shared(items))
    }

    /// New map node.
    pub fn map(object: Object) -> Self {
        Value::Map(shared(object))
    }

    pub fn regexp(source: &str, flags: &str) -> Self {
        Value::RegExp(RegExp {
            source: source.to_string(),
            flags: flags.to_string(),
        })
    }

    pub fn function(name: &str) -> Self {
        Value::Function(Function::new(name))
    }

    pub fn instance(class: &str, fields: Object) -> Self {
        Value::Instance(Instance::new(class, fields))
    }

    /// Parses JSON text. `__proto__` and friends stay ordinary own keys.
    pub fn parse_json(text: &str) -> Result<Self> {
        let json: serde_json::Value = serde_json::from_str(text)?;
        Ok(Value::from(json))
    }

    // == Inspection ==
    /// Runtime category name, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::BigInt(_) => "bigint",
            Value::String(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::Date(_) => "Date",
            Value::RegExp(_) => "RegExp",
            Value::Function(_) => "function",
            Value::List(_) => "Array",
            Value::Map(_) => "Object",
            Value::Instance(_) => "instance",
        }
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&Shared<Vec<Value>>> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Shared<Object>> {
        match self {
            Value::Map(object) => Some(object),
            _ => None,
        }
    }

    /// Address of the node behind a list, map or instance.
    pub fn node_id(&self) -> Option<usize> {
        match self {
            Value::List(items) => Some(Rc::as_ptr(items) as *const u8 as usize),
            Value::Map(object) => Some(Rc::as_ptr(object) as *const u8 as usize),
            Value::Instance(instance) => Some(Rc::as_ptr(&instance.fields) as *const u8 as usize),
            _ => None,
        }
    }

    /// True when both values are handles to the same node.
    pub fn same_node(&self, other: &Value) -> bool {
        match (self.node_id(), other.node_id()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

/// Extends a traversal path with a property key.
pub(crate) fn child_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    }
}

/// Extends a traversal path with a list index.
pub(crate) fn index_path(parent: &str, index: usize) -> String {
    format!("{}[{}]", parent, index)
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        crate::structural::deep_equal(self, other)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("undefined"),
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::BigInt(n) => write!(f, "{}n", n),
            Value::String(s) => write!(f, "{:?}", s),
            Value::Symbol(s) => write!(f, "{:?}", s),
            Value::Date(d) => write!(f, "Date({})", d.to_rfc3339()),
            Value::RegExp(r) => write!(f, "{}", r),
            Value::Function(func) => write!(f, "[Function {}]", func.name()),
            Value::List(_) | Value::Map(_) | Value::Instance(_) => {
                if let Value::Instance(instance) = self {
                    write!(f, "{} ", instance.class)?;
                }
                match to_json(self) {
                    Ok(Some(json)) => write!(f, "{}", json),
                    Ok(None) => f.write_str("undefined"),
                    Err(StructError::CircularReference(_)) => f.write_str("[Circular]"),
                    Err(err) => write!(f, "[Unserializable: {}]", err),
                }
            }
        }
    }
}

// == Conversions ==
impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(d: DateTime<Utc>) -> Self {
        Value::Date(d)
    }
}

impl From<Object> for Value {
    fn from(object: Object) -> Self {
        Value::map(object)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::list(items)
    }
}
