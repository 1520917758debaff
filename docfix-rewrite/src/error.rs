//! Error types raised by fix rules.

use docfix_schema::SchemaError;
use docfix_value::TypeMismatch;
use thiserror::Error;

/// A rule could not produce a document of its output type.
///
/// Most data anomalies are recovered inside the rule with a coercing accessor; this is for
/// the cases with no sensible default.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FixError {
    #[error(transparent)]
    TypeMismatch(#[from] TypeMismatch),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("`{type_id}` is missing required field `{field}`")]
    MissingField { type_id: String, field: String },

    #[error("field `{field}` holds unmapped value {value}")]
    UnmappedValue { field: String, value: String },

    #[error("invalid data: {reason}")]
    Invalid { reason: String },
}

impl FixError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        FixError::Invalid {
            reason: reason.into(),
        }
    }
}

pub type FixResult<T> = Result<T, FixError>;
