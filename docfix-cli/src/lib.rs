//! Library half of the `docfix` CLI: `docfix.toml` handling and fix explanations.

pub mod config;
pub mod explain;
