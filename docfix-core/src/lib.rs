//! Embeddable core library for docfix.
//!
//! Provides a clap-free, I/O-abstracted batch driver over a
//! [`FixPipeline`](docfix_pipeline::FixPipeline), suitable for linking into
//! a host process that stores versioned documents.
//!
//! # Port traits
//!
//! All I/O is abstracted behind port traits in [`ports`]:
//! - [`DocumentCodec`](ports::DocumentCodec): bytes to [`Value`] and back
//! - [`VersionReader`](ports::VersionReader): stored version of a decoded document
//! - [`DocumentSource`](ports::DocumentSource) / [`DocumentSink`](ports::DocumentSink):
//!   load and persist documents
//!
//! The [`adapters`] module provides default JSON, filesystem and in-memory implementations.
//!
//! # Entry points
//!
//! - [`run_migrate`](pipeline::run_migrate): migrate a batch of documents

pub mod adapters;
pub mod pipeline;
pub mod ports;
pub mod settings;

// Re-export the value type so embedders can implement ports without docfix-value.
pub use docfix_value::Value;
