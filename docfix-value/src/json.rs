//! Conversions between [`Value`] and `serde_json::Value`.
//!
//! Integers that fit in `i64` stay [`Value::Int`]; every other number becomes a float.
//! Going back, non-finite floats encode as `null` and byte sequences as arrays of ints.

use crate::{Map, Value};
use serde_json::Number;

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::from(s),
            serde_json::Value::Array(items) => Value::List(items.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(obj) => {
                Value::Map(obj.into_iter().map(|(k, v)| (k, Value::from(v))).collect::<Map>())
            }
        }
    }
}

impl From<&Value> for serde_json::Value {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::Number(Number::from(*i)),
            Value::Float(f) => Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.to_string()),
            Value::Bytes(b) => {
                serde_json::Value::Array(b.iter().map(|x| serde_json::Value::from(*x as i8)).collect())
            }
            Value::List(l) => serde_json::Value::Array(l.iter().map(serde_json::Value::from).collect()),
            Value::Map(m) => serde_json::Value::Object(
                m.iter()
                    .map(|(k, v)| (k.to_string(), serde_json::Value::from(v)))
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::Value;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn ints_stay_ints_and_floats_stay_floats() {
        let v = Value::from(json!({"a": 1, "b": 1.5, "c": [true, null]}));
        assert_eq!(v.field("a"), Some(&Value::Int(1)));
        assert_eq!(v.field("b"), Some(&Value::Float(1.5)));
        assert_eq!(serde_json::Value::from(&v), json!({"a": 1, "b": 1.5, "c": [true, null]}));
    }

    #[test]
    fn non_finite_floats_encode_as_null() {
        assert_eq!(serde_json::Value::from(&Value::Float(f64::INFINITY)), json!(null));
    }

    #[test]
    fn bytes_encode_as_signed_ints() {
        let v = Value::from(vec![1u8, 255]);
        assert_eq!(serde_json::Value::from(&v), json!([1, -1]));
    }
}
