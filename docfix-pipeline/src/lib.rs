//! Fix pipeline for docfix.
//!
//! This crate owns *when* fixes run: it validates that a catalog forms a contiguous schema
//! chain and migrates documents through the fixes newer than their stored version. *What*
//! a fix does is a [`docfix_rewrite::Rule`].

mod builder;
mod error;
mod fix;
mod migration;
mod pipeline;

pub use builder::PipelineBuilder;
pub use error::{MigrationError, PipelineError};
pub use fix::Fix;
pub use migration::{Migrated, Migration, MigrationState};
pub use pipeline::FixPipeline;
