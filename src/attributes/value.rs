//! Attribute values and tag sets

use std::collections::BTreeMap;
use std::fmt;

/// Kind of an attribute value, as named in the canonical encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Bool,
    Int64,
    Float64,
    String,
}

impl ValueKind {
    /// Name used in the `Type` field of the canonical encoding
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Bool => "BOOL",
            ValueKind::Int64 => "INT64",
            ValueKind::Float64 => "FLOAT64",
            ValueKind::String => "STRING",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attribute value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    I64(i64),
    F64(f64),
    String(String),
}

impl Value {
    /// Kind of this value
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Bool(_) => ValueKind::Bool,
            Value::I64(_) => ValueKind::Int64,
            Value::F64(_) => ValueKind::Float64,
            Value::String(_) => ValueKind::String,
        }
    }

    /// Get the value as a bool, if it is one
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the value as a string slice, if it is one
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::I64(i) => write!(f, "{}", i),
            Value::F64(v) => write!(f, "{}", v),
            Value::String(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::I64(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::F64(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

/// A single tag: key plus typed value
#[derive(Debug, Clone, PartialEq)]
pub struct KeyValue {
    pub key: String,
    pub value: Value,
}

impl KeyValue {
    /// Create a tag from any value convertible to [`Value`]
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Create a string tag
    pub fn string(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(key, Value::String(value.into()))
    }

    /// Create a bool tag
    pub fn bool(key: impl Into<String>, value: bool) -> Self {
        Self::new(key, Value::Bool(value))
    }

    /// Create an integer tag
    pub fn i64(key: impl Into<String>, value: i64) -> Self {
        Self::new(key, Value::I64(value))
    }

    /// Create a float tag
    pub fn f64(key: impl Into<String>, value: f64) -> Self {
        Self::new(key, Value::F64(value))
    }
}

/// Unordered set of tags with unique keys.
///
/// Built from any sequence of tags; when a key repeats, the later value
/// replaces the earlier one. Iteration is always in ascending key order, so
/// two equivalent sets compare equal regardless of how they were built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeSet {
    entries: BTreeMap<String, Value>,
}

impl AttributeSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a tag, replacing any previous value for its key
    pub fn insert(&mut self, kv: KeyValue) -> Option<Value> {
        self.entries.insert(kv.key, kv.value)
    }

    /// Get the value for a key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Number of tags
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the set has no tags
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate tags in ascending key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Tags in ascending key order
    pub fn to_vec(&self) -> Vec<KeyValue> {
        self.entries
            .iter()
            .map(|(k, v)| KeyValue {
                key: k.clone(),
                value: v.clone(),
            })
            .collect()
    }
}

impl FromIterator<KeyValue> for AttributeSet {
    fn from_iter<I: IntoIterator<Item = KeyValue>>(iter: I) -> Self {
        let mut set = AttributeSet::new();
        for kv in iter {
            set.insert(kv);
        }
        set
    }
}

impl<'a> FromIterator<&'a KeyValue> for AttributeSet {
    fn from_iter<I: IntoIterator<Item = &'a KeyValue>>(iter: I) -> Self {
        iter.into_iter().cloned().collect()
    }
}

// =============================================================================
// Tests
// =============================================================================
