use crate::demo::DemoRefs;
use docfix_rewrite::Rule;
use docfix_schema::{DataVersion, SchemaBuilder};

mod block_entity_rename;
mod entity_uuid;
mod fish_type;
mod mob_effect_id;
mod new_mobs;
mod random_sequence_settings;
mod skeleton_split;

/// Static description of a built-in fix, used by `list-fixes` and `explain`.
#[derive(Debug, Clone)]
pub struct FixMeta {
    /// Short user-facing key (e.g. "fish-type").
    pub key: &'static str,
    /// Name the fix is registered under in the pipeline.
    pub name: &'static str,
    pub version: DataVersion,
    pub title: &'static str,
    pub description: &'static str,
    /// Reference names the fix reads or rewrites.
    pub references: &'static [&'static str],
}

/// A fix in the built-in catalog: its schema step and its rule.
pub trait CatalogFix: Send + Sync {
    fn meta(&self) -> &'static FixMeta;

    /// Shapes the output schema from its parent. Fixes that share a version with an earlier
    /// fix reuse that fix's schema; editing it there fails the catalog build.
    fn schema(&self, _refs: &DemoRefs, schema: SchemaBuilder) -> SchemaBuilder {
        schema
    }

    fn rule(&self, refs: &DemoRefs) -> Rule;
}

/// Every built-in fix in registration order.
pub fn builtin_fixes() -> Vec<Box<dyn CatalogFix>> {
    vec![
        Box::new(fish_type::FishTypeFix),
        Box::new(skeleton_split::SkeletonSplitFix),
        Box::new(new_mobs::NewMobsFix),
        Box::new(mob_effect_id::MobEffectIdFix),
        Box::new(block_entity_rename::BlockEntityRenameFix),
        Box::new(entity_uuid::EntityUuidFix),
        Box::new(random_sequence_settings::RandomSequenceSettingsFix),
    ]
}

pub fn builtin_fix_metas() -> Vec<&'static FixMeta> {
    builtin_fixes().iter().map(|f| f.meta()).collect()
}

/// Finds a fix by key or pipeline name, ignoring case and `-`/`_` differences.
pub fn lookup_fix(query: &str) -> Option<&'static FixMeta> {
    let wanted = normalize_key(query);
    builtin_fix_metas()
        .into_iter()
        .find(|m| normalize_key(m.key) == wanted || normalize_key(m.name) == wanted)
}

fn normalize_key(s: &str) -> String {
    s.trim().to_ascii_lowercase().replace('_', "-")
}
