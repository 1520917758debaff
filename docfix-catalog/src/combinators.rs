//! Reusable rule shapes for catalog fixes.
//!
//! Each function returns a [`Rule`] that owns everything it needs, so the rule can be stored
//! in a pipeline and applied from any thread.

use docfix_rewrite::{FixError, FixResult, Rule, TypedValue};
use docfix_schema::{FieldSpec, Reference, SchemaBuilder};
use docfix_value::{Map, TypeMismatch, Value, ValueKind};
use std::sync::Arc;
use tracing::warn;

/// What to do with a legacy code that has no entry in an [`EnumTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumFallback {
    /// Keep the raw value under the new field name.
    Keep,
    /// Drop the field.
    #[default]
    Drop,
    /// Fail the fix for this document.
    Fail,
}

/// Legacy integer code to id mapping.
#[derive(Debug, Clone)]
pub struct EnumTable {
    entries: Arc<[(i64, Arc<str>)]>,
}

impl EnumTable {
    pub fn new(entries: &[(i64, &str)]) -> Self {
        Self {
            entries: entries
                .iter()
                .map(|(code, id)| (*code, Arc::from(*id)))
                .collect(),
        }
    }

    pub fn get(&self, code: i64) -> Option<&str> {
        self.entries
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, id)| id.as_ref())
    }
}

/// Replaces the numeric `old` field of `value` by its mapped id under `new`.
///
/// Absent fields are left alone. Numeric strings and floats are read as codes.
pub fn remap_enum_field(
    value: &Value,
    old: &str,
    new: &str,
    table: &EnumTable,
    fallback: EnumFallback,
) -> FixResult<Value> {
    let Some(current) = value.field(old) else {
        return Ok(value.clone());
    };
    if let Some(id) = current.to_i64().and_then(|code| table.get(code)) {
        return Ok(value.replace_field(old, new, Some(Value::from(id))));
    }
    match fallback {
        EnumFallback::Keep => {
            warn!(field = old, value = %current, "unmapped enum value kept as is");
            Ok(value.rename_field(old, new))
        }
        EnumFallback::Drop => {
            warn!(field = old, value = %current, "unmapped enum value dropped");
            Ok(value.remove(old))
        }
        EnumFallback::Fail => Err(FixError::UnmappedValue {
            field: old.to_string(),
            value: current.to_string(),
        }),
    }
}

/// Applies `f` to every node of `reference`, or only to nodes with `type_id` when given.
pub fn edit_records<F>(reference: &Reference, type_id: Option<&str>, f: F) -> Rule
where
    F: Fn(&Value) -> FixResult<Value> + Send + Sync + 'static,
{
    match type_id {
        Some(id) => {
            let id: Arc<str> = Arc::from(id);
            Rule::everywhere(reference, move |typed| edit_if_named(typed, &id, &f))
        }
        None => Rule::convert(reference, move |v| f(v).map(Some)),
    }
}

/// Applies `f` to the value of `typed` if it has `type_id`.
pub fn edit_if_named(
    typed: TypedValue,
    type_id: &str,
    f: impl FnOnce(&Value) -> FixResult<Value>,
) -> FixResult<TypedValue> {
    if !typed.is(type_id) {
        return Ok(typed);
    }
    let next = f(typed.value())?;
    Ok(typed.with_value(next))
}

/// Runs a value-level edit over a bare map, as handed out by remainder helpers.
pub fn edit_map(map: Map, f: impl FnOnce(&Value) -> FixResult<Value>) -> FixResult<Map> {
    match f(&Value::Map(map))? {
        Value::Map(out) => Ok(out),
        other => Err(FixError::TypeMismatch(TypeMismatch {
            expected: ValueKind::Map,
            found: other.kind(),
        })),
    }
}

pub fn rename_fields(reference: &Reference, type_id: Option<&str>, renames: &[(&str, &str)]) -> Rule {
    let renames = owned_pairs(renames);
    edit_records(reference, type_id, move |v| {
        Ok(renames
            .iter()
            .fold(v.clone(), |acc, (old, new)| acc.rename_field(old, new)))
    })
}

pub fn remove_fields(reference: &Reference, type_id: Option<&str>, fields: &[&str]) -> Rule {
    let fields: Vec<String> = fields.iter().map(|f| f.to_string()).collect();
    edit_records(reference, type_id, move |v| {
        Ok(fields.iter().fold(v.clone(), |acc, f| acc.remove(f)))
    })
}

/// Rewrites a numeric enum field into namespaced string ids.
pub fn remap_enum(
    reference: &Reference,
    type_id: Option<&str>,
    old: &str,
    new: &str,
    table: EnumTable,
    fallback: EnumFallback,
) -> Rule {
    let (old, new) = (old.to_string(), new.to_string());
    edit_records(reference, type_id, move |v| {
        remap_enum_field(v, &old, &new, &table, fallback)
    })
}

/// Renames type-ids of `reference`. Ids not in `renames` are untouched.
pub fn rename_choices(reference: &Reference, renames: &[(&str, &str)]) -> Rule {
    let renames = owned_pairs(renames);
    Rule::everywhere(reference, move |typed| {
        match renames.iter().find(|(old, _)| typed.is(old)) {
            Some((_, new)) => Ok(typed.retag(new)),
            None => Ok(typed),
        }
    })
}

/// Splits one type-id into several, chosen by an integer discriminator field.
///
/// The discriminator is removed; codes missing from `table` keep the original id.
pub fn split_choice(reference: &Reference, from: &str, discriminator: &str, table: EnumTable) -> Rule {
    let discriminator = discriminator.to_string();
    Rule::named(reference, from, move |record| {
        let code = record.get(&discriminator).map_or(0, |v| v.as_int(0));
        let record = record.remove(&discriminator);
        Ok(match table.get(code) {
            Some(id) => record.retag(id),
            None => record,
        })
    })
}

/// Sets `key` to `value` on records that lack it.
pub fn add_field_if_missing(
    reference: &Reference,
    type_id: Option<&str>,
    key: &str,
    value: Value,
) -> Rule {
    let key = key.to_string();
    match type_id {
        Some(id) => Rule::named(reference, id, move |record| {
            if record.contains(&key) {
                Ok(record)
            } else {
                Ok(record.set(&key, value.clone()))
            }
        }),
        None => Rule::convert(reference, move |v| {
            if v.as_map().is_none() || v.has_field(&key) {
                Ok(None)
            } else {
                Ok(Some(v.set(key.as_str(), value.clone())))
            }
        }),
    }
}

pub fn add_flag_if_missing(reference: &Reference, flag: &str, default: bool) -> Rule {
    add_field_if_missing(reference, None, flag, Value::from(default))
}

/// Applies `f` to the remainder of every node of `reference`.
pub fn update_remainder_everywhere<F>(reference: &Reference, f: F) -> Rule
where
    F: Fn(Map) -> FixResult<Map> + Send + Sync + 'static,
{
    Rule::everywhere(reference, move |typed| typed.update_remainder(&f))
}

/// Declares new type-ids with no modeled fields. The matching fix rule is [`Rule::Nop`]:
/// existing data is already valid under the widened schema.
pub fn add_new_choices(schema: SchemaBuilder, reference: &Reference, ids: &[&str]) -> SchemaBuilder {
    ids.iter()
        .fold(schema, |s, id| s.add_choice(reference, id, FieldSpec::opaque()))
}

/// Rewrites un-namespaced type-ids into their namespaced form.
pub fn ensure_namespaced_ids(reference: &Reference) -> Rule {
    let Some(tag) = reference.tag_key().map(str::to_string) else {
        return Rule::Nop;
    };
    Rule::everywhere(reference, move |typed| {
        let raw = typed.value().field(&tag).and_then(Value::as_str);
        match typed.type_id() {
            Some(id) if raw.is_some_and(|raw| raw != id) => {
                let id = id.to_string();
                Ok(typed.retag(&id))
            }
            _ => Ok(typed),
        }
    })
}

fn owned_pairs(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(a, b)| (a.to_string(), b.to_string()))
        .collect()
}
