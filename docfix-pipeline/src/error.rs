//! Error types for docfix-pipeline.
//!
//! - [`PipelineError`]: the catalog is misconfigured. Raised while building, always fatal.
//! - [`MigrationError`]: one document could not be migrated. Carries the partial result.

use docfix_rewrite::FixError;
use docfix_schema::{DataVersion, SchemaError};
use docfix_value::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// A fix's input schema is not the output schema of the fix before it.
    #[error(
        "fix `{next}` reads schema {found}, but the preceding fix `{previous}` produces {expected}"
    )]
    NonContiguousSchemaChain {
        previous: String,
        next: String,
        expected: DataVersion,
        found: DataVersion,
    },

    #[error("fix `{name}` is registered twice at version {version}")]
    DuplicateFix { name: String, version: DataVersion },

    /// The fix version disagrees with its output schema, or its input is not older.
    #[error("fix `{name}` at {version} maps schema {input} to {output}")]
    SchemaVersionMismatch {
        name: String,
        version: DataVersion,
        input: DataVersion,
        output: DataVersion,
    },

    #[error("fix `{fix}` targets `{reference}`, which is not in the reference registry")]
    UnregisteredReference { fix: String, reference: String },

    /// A fix tried to reshape a schema an earlier fix at the same version already defined.
    #[error("fix `{name}` edits the schema at {version}, which an earlier fix already defined")]
    SchemaRedefined { name: String, version: DataVersion },

    #[error("fix `{name}` needs a schema with a parent; register two schemas first")]
    NoParentSchema { name: String },

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// A fix failed on one document. The document stays at the last fully applied version;
/// fixes of the failing version that already ran are rolled back.
#[derive(Debug, Clone, Error)]
#[error("fix `{fix}` ({fix_version}) failed; document left at {applied_version}: {source}")]
pub struct MigrationError {
    pub fix: String,
    pub fix_version: DataVersion,
    pub applied_version: DataVersion,
    /// Document at `applied_version`. Migrating it from there re-runs nothing.
    pub partial: Value,
    pub source: FixError,
}
