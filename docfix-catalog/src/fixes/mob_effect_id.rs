use super::{CatalogFix, FixMeta};
use crate::combinators::{EnumFallback, EnumTable, edit_records, remap_enum_field};
use crate::demo::DemoRefs;
use docfix_rewrite::{FixResult, Rule};
use docfix_schema::DataVersion;
use docfix_value::Value;
use tracing::warn;

pub struct MobEffectIdFix;

static META: FixMeta = FixMeta {
    key: "mob-effect-id",
    name: "mob_effect_id",
    version: DataVersion::new(13, 0),
    title: "Namespaced mob effect ids",
    description: "Numeric effect ids become namespaced strings and effect fields move to \
                  snake case, including hidden effects, mooshroom stew effects, arrow and \
                  area cloud potions, beacon powers and player effects. Unknown ids are \
                  dropped.",
    references: &["entity", "block-entity", "player"],
};

const EFFECT_IDS: &[(i64, &str)] = &[
    (1, "demo:speed"),
    (2, "demo:slowness"),
    (3, "demo:haste"),
    (4, "demo:mining_fatigue"),
    (5, "demo:strength"),
    (10, "demo:regeneration"),
    (12, "demo:fire_resistance"),
    (14, "demo:invisibility"),
    (16, "demo:night_vision"),
    (19, "demo:poison"),
    (24, "demo:glowing"),
];

const EFFECT_FIELDS: &[(&str, &str)] = &[
    ("Ambient", "ambient"),
    ("Amplifier", "amplifier"),
    ("Duration", "duration"),
    ("ShowParticles", "show_particles"),
    ("ShowIcon", "show_icon"),
];

/// Stew duration when a mooshroom stored an effect without one.
const DEFAULT_STEW_DURATION: i64 = 160;

impl CatalogFix for MobEffectIdFix {
    fn meta(&self) -> &'static FixMeta {
        &META
    }

    fn rule(&self, refs: &DemoRefs) -> Rule {
        let table = EnumTable::new(EFFECT_IDS);
        let t = table.clone();
        let living = edit_records(&refs.entity, None, move |v| {
            effect_list(v, "ActiveEffects", "active_effects", &t)
        });
        let t = table.clone();
        let mooshroom = edit_records(&refs.entity, Some("demo:mooshroom"), move |v| {
            stew_effect(v, &t)
        });
        let t = table.clone();
        let arrow = edit_records(&refs.entity, Some("demo:arrow"), move |v| {
            effect_list(v, "CustomPotionEffects", "custom_potion_effects", &t)
        });
        let t = table.clone();
        let cloud = edit_records(&refs.entity, Some("demo:area_effect_cloud"), move |v| {
            effect_list(v, "Effects", "effects", &t)
        });
        let t = table.clone();
        let beacon = edit_records(&refs.block_entity, Some("demo:beacon"), move |v| {
            let v = remap_enum_field(v, "Primary", "primary_effect", &t, EnumFallback::Drop)?;
            remap_enum_field(&v, "Secondary", "secondary_effect", &t, EnumFallback::Drop)
        });
        let player = edit_records(&refs.player, None, move |v| {
            effect_list(v, "ActiveEffects", "active_effects", &table)
        });
        Rule::seq([living, mooshroom, arrow, cloud, beacon, player])
    }
}

/// Rewrites one effect instance, recursing into its hidden effect.
fn effect_instance(effect: &Value, table: &EnumTable) -> FixResult<Value> {
    let out = remap_enum_field(effect, "Id", "id", table, EnumFallback::Drop)?;
    let out = EFFECT_FIELDS
        .iter()
        .fold(out, |acc, (old, new)| acc.rename_field(old, new));
    match out.field("HiddenEffect") {
        Some(hidden) => {
            let hidden = effect_instance(hidden, table)?;
            Ok(out.replace_field("HiddenEffect", "hidden_effect", Some(hidden)))
        }
        None => Ok(out),
    }
}

/// Moves the effect list at `old` to `new`, rewriting each entry. A non-list is dropped.
fn effect_list(value: &Value, old: &str, new: &str, table: &EnumTable) -> FixResult<Value> {
    let Some(current) = value.field(old) else {
        return Ok(value.clone());
    };
    let Some(effects) = current.as_list() else {
        warn!(field = old, kind = %current.kind(), "effect list is not a list, dropped");
        return Ok(value.remove(old));
    };
    let effects = effects
        .iter()
        .map(|e| effect_instance(e, table))
        .collect::<FixResult<Vec<_>>>()?;
    Ok(value.replace_field(old, new, Some(Value::list_of(effects))))
}

fn stew_effect(value: &Value, table: &EnumTable) -> FixResult<Value> {
    let Some(code) = value.field("EffectId") else {
        return Ok(value.clone());
    };
    let duration = value
        .field("EffectDuration")
        .map_or(DEFAULT_STEW_DURATION, |d| d.as_int(DEFAULT_STEW_DURATION));
    let stripped = value.remove("EffectId").remove("EffectDuration");
    match code.to_i64().and_then(|c| table.get(c)) {
        Some(id) => Ok(stripped.set(
            "stew_effects",
            Value::list_of([Value::map_of([
                ("id", Value::from(id)),
                ("duration", Value::from(duration)),
            ])]),
        )),
        None => {
            warn!(value = %code, "unmapped stew effect dropped");
            Ok(stripped)
        }
    }
}
