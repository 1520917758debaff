//! Rewrite engine for docfix.
//!
//! Responsibilities:
//! - Pair raw values with the schema type they are asserted to have ([`TypedValue`]).
//! - Describe what a fix does as a [`Rule`] value.
//! - Walk a document bottom-up and apply a rule exactly where the schema says its target
//!   lives ([`apply_rule`]), sharing every untouched sub-tree with the input.

mod engine;
mod error;
mod rule;
mod typed;

pub use engine::{apply_rule, apply_rule_between};
pub use error::{FixError, FixResult};
pub use rule::{ConvertFn, RecordFn, Rule, TypedFn};
pub use typed::{Record, TypedValue};
