//! Error types for docfix-schema.

use crate::{DataVersion, Shape};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// The same reference name was registered twice with different shapes.
    #[error("reference `{name}` already registered as {existing}, not {requested}")]
    DuplicateReference {
        name: String,
        existing: Shape,
        requested: Shape,
    },

    #[error("reference `{name}` is not known to schema {version}")]
    UnknownReference { name: String, version: DataVersion },

    #[error("type-id `{type_id}` is not a choice of `{reference}` in schema {version}")]
    UnknownTypeId {
        reference: String,
        type_id: String,
        version: DataVersion,
    },

    #[error("reference `{reference}` is not a choice type in schema {version}")]
    NotAChoice {
        reference: String,
        version: DataVersion,
    },

    /// The type registered for a reference disagrees with the reference's declared shape.
    #[error("type registered for `{reference}` does not fit its shape: {detail}")]
    ShapeMismatch { reference: String, detail: String },

    #[error("schema {version} must be newer than its parent {parent}")]
    VersionNotIncreasing {
        version: DataVersion,
        parent: DataVersion,
    },
}

pub type SchemaResult<T> = Result<T, SchemaError>;
