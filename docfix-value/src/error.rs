use std::fmt;
use thiserror::Error;

/// Coarse shape of a [`Value`](crate::Value), used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Map,
    List,
    String,
    Int,
    Float,
    Bool,
    Bytes,
    Null,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ValueKind::Map => "map",
            ValueKind::List => "list",
            ValueKind::String => "string",
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::Bool => "bool",
            ValueKind::Bytes => "bytes",
            ValueKind::Null => "null",
        };
        f.write_str(s)
    }
}

/// A field access assumed a shape the data does not have.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("type mismatch: expected {expected}, found {found}")]
pub struct TypeMismatch {
    pub expected: ValueKind,
    pub found: ValueKind,
}

#[cfg(test)]
mod tests {
    use super::{TypeMismatch, ValueKind};

    #[test]
    fn display_names_both_shapes() {
        let err = TypeMismatch {
            expected: ValueKind::Map,
            found: ValueKind::Int,
        };
        assert_eq!(err.to_string(), "type mismatch: expected map, found int");
    }
}
