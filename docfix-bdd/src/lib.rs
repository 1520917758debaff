//! BDD harness (cucumber-rs).
//!
//! This crate exists to keep scenario tests isolated from the production crates. The
//! helpers here are shared by the step definitions in `tests/cucumber.rs`.

use anyhow::Context;
use camino::Utf8Path;
use fs_err as fs;

/// Name of the document file each scenario migrates.
pub const DOCUMENT_FILE: &str = "document.json";

/// Parses a JSON document written in a feature file.
pub fn parse_document(text: &str) -> anyhow::Result<serde_json::Value> {
    serde_json::from_str(text.trim()).context("feature document is not valid JSON")
}

/// Writes `document` into `dir` as [`DOCUMENT_FILE`].
pub fn write_document(dir: &Utf8Path, document: &serde_json::Value) -> anyhow::Result<()> {
    let path = dir.join(DOCUMENT_FILE);
    let text = serde_json::to_string_pretty(document)?;
    fs::write(&path, text).with_context(|| format!("write {}", path))
}
