//! Built-in fixes for docfix.
//!
//! Responsibilities:
//! - Reusable rule shapes ([`combinators`]) for the common fix families.
//! - The demo registry and schema chain ([`DemoCatalog`]).
//! - Static metadata for `list-fixes` and `explain` ([`FixMeta`]).

pub mod combinators;
mod demo;
mod fixes;

pub use demo::{BASE_VERSION, DemoCatalog, DemoRefs, NAMESPACE};
pub use fixes::{CatalogFix, FixMeta, builtin_fix_metas, builtin_fixes, lookup_fix};
