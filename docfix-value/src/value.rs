use crate::{List, Map, TypeMismatch, ValueKind};
use std::fmt;
use std::sync::Arc;

/// One node of a decoded document.
#[derive(Clone)]
pub enum Value {
    Map(Map),
    List(List),
    String(Arc<str>),
    Int(i64),
    Float(f64),
    Bool(bool),
    Bytes(Arc<[u8]>),
    Null,
}

impl Value {
    pub fn empty_map() -> Value {
        Value::Map(Map::new())
    }

    pub fn empty_list() -> Value {
        Value::List(List::new())
    }

    pub fn string(s: impl Into<Arc<str>>) -> Value {
        Value::String(s.into())
    }

    pub fn map_of<K: Into<Arc<str>>>(entries: impl IntoIterator<Item = (K, Value)>) -> Value {
        Value::Map(entries.into_iter().collect())
    }

    pub fn list_of(items: impl IntoIterator<Item = Value>) -> Value {
        Value::List(items.into_iter().collect())
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Map(_) => ValueKind::Map,
            Value::List(_) => ValueKind::List,
            Value::String(_) => ValueKind::String,
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::Bool(_) => ValueKind::Bool,
            Value::Bytes(_) => ValueKind::Bytes,
            Value::Null => ValueKind::Null,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&List> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn is_empty_map(&self) -> bool {
        matches!(self, Value::Map(m) if m.is_empty())
    }

    // ------------------------------------------------------------------
    // Field access
    // ------------------------------------------------------------------

    /// Field lookup on a map. Any other receiver is a [`TypeMismatch`].
    pub fn get(&self, key: &str) -> Result<Option<&Value>, TypeMismatch> {
        match self {
            Value::Map(m) => Ok(m.get(key)),
            other => Err(TypeMismatch {
                expected: ValueKind::Map,
                found: other.kind(),
            }),
        }
    }

    /// Total form of [`Value::get`]: `None` for absent keys and non-map receivers.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.as_map().and_then(|m| m.get(key))
    }

    /// Follows a chain of map keys.
    pub fn get_path(&self, path: &[&str]) -> Option<&Value> {
        path.iter().try_fold(self, |cur, key| cur.field(key))
    }

    pub fn has_field(&self, key: &str) -> bool {
        self.field(key).is_some()
    }

    // ------------------------------------------------------------------
    // Persistent updates. Non-map receivers come back unchanged.
    // ------------------------------------------------------------------

    pub fn set(&self, key: impl Into<Arc<str>>, value: Value) -> Value {
        match self {
            Value::Map(m) => Value::Map(m.with(key, value)),
            other => other.clone(),
        }
    }

    pub fn remove(&self, key: &str) -> Value {
        match self {
            Value::Map(m) => Value::Map(m.without(key)),
            other => other.clone(),
        }
    }

    /// Applies `f` to the value at `key`. Absent keys leave the map untouched.
    pub fn update(&self, key: &str, f: impl FnOnce(&Value) -> Value) -> Value {
        match self.field(key) {
            Some(current) => self.set(key, f(current)),
            None => self.clone(),
        }
    }

    /// Applies `f` to the value at `key`, or to `default` when the key is absent.
    pub fn update_or(&self, key: &str, default: Value, f: impl FnOnce(&Value) -> Value) -> Value {
        if self.as_map().is_none() {
            return self.clone();
        }
        let next = match self.field(key) {
            Some(current) => f(current),
            None => f(&default),
        };
        self.set(key, next)
    }

    /// Moves `old` to `new` in place. No-op when `old` is absent.
    pub fn rename_field(&self, old: &str, new: &str) -> Value {
        match self {
            Value::Map(m) => Value::Map(m.renamed(old, new)),
            other => other.clone(),
        }
    }

    /// Removes `old` and, when `value` is given, writes it under `new` at the old slot
    /// (or appended if `old` was absent).
    pub fn replace_field(&self, old: &str, new: &str, value: Option<Value>) -> Value {
        let Value::Map(m) = self else {
            return self.clone();
        };
        match value {
            Some(v) if m.contains_key(old) => Value::Map(m.renamed(old, new).with(new, v)),
            Some(v) => Value::Map(m.with(new, v)),
            None => Value::Map(m.without(old)),
        }
    }

    /// Right-biased map merge. A non-map on either side leaves `self` unchanged.
    pub fn merge(&self, other: &Value) -> Value {
        match (self, other) {
            (Value::Map(a), Value::Map(b)) => Value::Map(a.merged(b)),
            _ => self.clone(),
        }
    }

    // ------------------------------------------------------------------
    // Coercing accessors. Never fail.
    // ------------------------------------------------------------------

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_string(&self, default: &str) -> String {
        match self {
            Value::String(s) => s.to_string(),
            _ => default.to_string(),
        }
    }

    /// Numeric view: ints as is, floats truncated, bools as 0/1, numeric strings parsed.
    pub fn to_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Float(f) if f.is_finite() => Some(*f as i64),
            Value::Bool(b) => Some(i64::from(*b)),
            Value::String(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f as i64))
            }
            _ => None,
        }
    }

    pub fn as_int(&self, default: i64) -> i64 {
        self.to_i64().unwrap_or(default)
    }

    /// Signed byte view. Out-of-range numbers wrap like a two's complement narrowing cast.
    pub fn as_byte(&self, default: i8) -> i8 {
        self.to_i64().map_or(default, |i| i as i8)
    }

    pub fn as_f64(&self, default: f64) -> f64 {
        match self {
            Value::Float(f) => *f,
            Value::Int(i) => *i as f64,
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::String(s) => s.trim().parse().unwrap_or(default),
            _ => default,
        }
    }

    /// Booleans as is, numbers are true when non-zero.
    pub fn as_bool(&self, default: bool) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            _ => default,
        }
    }

    // ------------------------------------------------------------------
    // Lists
    // ------------------------------------------------------------------

    /// Elements of a list; empty for anything else.
    pub fn as_sequence(&self) -> impl Iterator<Item = &Value> + '_ {
        self.as_list().into_iter().flat_map(|l| l.iter())
    }

    /// Maps every list element. Non-list receivers come back unchanged.
    pub fn map(&self, f: impl FnMut(&Value) -> Value) -> Value {
        match self {
            Value::List(l) => Value::List(l.iter().map(f).collect()),
            other => other.clone(),
        }
    }

    pub fn filter(&self, mut keep: impl FnMut(&Value) -> bool) -> Value {
        match self {
            Value::List(l) => Value::List(l.iter().filter(|v| keep(v)).cloned().collect()),
            other => other.clone(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            // Bitwise so that NaN payloads survive a round-trip comparison.
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::Null, Value::Null) => true,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Map(m) => m.fmt(f),
            Value::List(l) => f.debug_list().entries(l.iter()).finish(),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x:?}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Bytes(b) => write!(f, "bytes{:?}", &b[..]),
            Value::Null => f.write_str("null"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::Value::from(self);
        write!(f, "{json}")
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(Arc::from(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(Arc::from(v))
    }
}

impl From<Map> for Value {
    fn from(v: Map) -> Self {
        Value::Map(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(Arc::from(v))
    }
}
