//! Fix explanation module for the `docfix explain` command.
//!
//! Combines the static [`FixMeta`] of a built-in fix with what the built pipeline knows
//! about it: the schema versions it migrates between and the references its rule targets.

use docfix_catalog::{FixMeta, builtin_fix_metas};
use docfix_pipeline::FixPipeline;
use std::fmt::Write;

const RULE: &str =
    "--------------------------------------------------------------------------------";
const BANNER: &str =
    "================================================================================";

/// All user-facing fix keys, in version order.
pub fn list_fix_keys() -> Vec<&'static str> {
    builtin_fix_metas().iter().map(|m| m.key).collect()
}

/// Renders the `explain` page for one fix.
pub fn render_explanation(meta: &FixMeta, pipeline: &FixPipeline) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{BANNER}");
    let _ = writeln!(out, "FIX: {}", meta.title);
    let _ = writeln!(out, "{BANNER}");
    let _ = writeln!(out);
    let _ = writeln!(out, "Key:      {}", meta.key);
    let _ = writeln!(out, "Name:     {}", meta.name);
    let _ = writeln!(out, "Version:  {}", meta.version);
    if let Some(fix) = pipeline.fixes().iter().find(|f| f.name() == meta.name) {
        let _ = writeln!(
            out,
            "Schemas:  {} -> {}",
            fix.input().version(),
            fix.output().version()
        );
        let targets: Vec<String> = fix.rule().targets().iter().map(|r| r.to_string()).collect();
        if targets.is_empty() {
            let _ = writeln!(out, "Rewrites: nothing (schema-only change)");
        } else {
            let _ = writeln!(out, "Rewrites: {}", targets.join(", "));
        }
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "DESCRIPTION");
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "{}", meta.description);
    let _ = writeln!(out);
    let _ = writeln!(out, "DOCUMENT CATEGORIES");
    let _ = writeln!(out, "{RULE}");
    for reference in meta.references {
        let _ = writeln!(out, "  - {reference}");
    }
    out
}
