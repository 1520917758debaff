//! Generic document tree for docfix.
//!
//! # Design constraints
//! - Values are immutable. Every update returns a new value; untouched sub-trees are shared
//!   with the original (persistent `im` collections, `Arc` leaves), never copied.
//! - Accessors that read legacy data are total: they coerce or fall back to a default
//!   instead of failing. Only direct field access on a non-map reports [`TypeMismatch`].
//! - The tree knows nothing about encodings; see [`json`] for the JSON bridge.

mod error;
pub mod json;
mod map;
mod value;

pub use error::{TypeMismatch, ValueKind};
pub use map::Map;
pub use value::Value;

/// Persistent list type used by [`Value::List`].
pub type List = im::Vector<Value>;
