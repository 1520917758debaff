//! Schema model for docfix.
//!
//! # Design constraints
//! - A [`Reference`] names a document category for the whole life of the format. It is never
//!   removed from a schema chain, only introduced.
//! - A [`Schema`] is immutable once built. Derived schemas share their parent's type table
//!   structurally and only record overrides.
//! - Lookups that run against document data are lenient (unknown type-ids resolve to an
//!   opaque field spec). Strict lookups exist for fix authors.

mod error;
mod reference;
mod schema;
mod types;
mod version;

pub use error::{SchemaError, SchemaResult};
pub use reference::{Reference, ReferenceRegistry, Shape};
pub use schema::{Schema, SchemaBuilder};
pub use types::{ChoiceType, FieldSpec, Type, ensure_namespaced};
pub use version::{DataVersion, ParseVersionError};
