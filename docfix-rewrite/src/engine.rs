//! Bottom-up traversal that applies a [`Rule`] where the schema places its target.
//!
//! Every visit returns `Option<Value>`: `None` means the sub-tree is untouched and the caller
//! keeps sharing its input; `Some` carries the rewritten sub-tree. Collections are rebuilt
//! only when at least one element changed.

use crate::{FixResult, Rule, TypedValue};
use docfix_schema::{FieldSpec, Reference, Schema, Type};
use docfix_value::{Map, Value};
use std::sync::Arc;
use tracing::trace;

/// Applies `rule` to a document of category `reference`, typed under `schema`.
///
/// Documents of categories the schema does not declare, and type-ids it does not know, are
/// passed through untouched.
pub fn apply_rule(
    rule: &Rule,
    schema: &Arc<Schema>,
    reference: &Reference,
    document: &Value,
) -> FixResult<Value> {
    apply_rule_between(rule, schema, schema, reference, document)
}

/// Applies the rule of a fix from `input` to `output`.
///
/// Nodes are typed under `input`. A node whose type-id only `output` knows (because an
/// earlier rule in the same sequence renamed or split it) is typed under `output`, so later
/// rules still reach its nested children.
pub fn apply_rule_between(
    rule: &Rule,
    input: &Arc<Schema>,
    output: &Arc<Schema>,
    reference: &Reference,
    document: &Value,
) -> FixResult<Value> {
    match rule {
        Rule::Nop => Ok(document.clone()),
        Rule::Seq(rules) => rules.iter().try_fold(document.clone(), |doc, r| {
            apply_rule_between(r, input, output, reference, &doc)
        }),
        single => {
            let Some(target) = single.target() else {
                return Ok(document.clone());
            };
            let walker = Walker {
                rule: single,
                target,
                schema: input,
                output,
            };
            Ok(walker
                .visit_reference(reference, document)?
                .unwrap_or_else(|| document.clone()))
        }
    }
}

struct Walker<'a> {
    rule: &'a Rule,
    target: &'a Reference,
    schema: &'a Arc<Schema>,
    output: &'a Arc<Schema>,
}

impl<'a> Walker<'a> {
    /// Schema a tagged node is typed under: the input schema unless only the output
    /// schema knows its type-id.
    fn schema_for(&self, reference: &Reference, value: &Value) -> &'a Arc<Schema> {
        if Arc::ptr_eq(self.schema, self.output) {
            return self.schema;
        }
        let knows = |schema: &Arc<Schema>| {
            let (Some(choice), Some(tag)) = (schema.choice(reference), reference.tag_key()) else {
                return false;
            };
            value
                .field(tag)
                .and_then(Value::as_str)
                .is_some_and(|id| choice.contains(id))
        };
        if !knows(self.schema) && knows(self.output) {
            self.output
        } else {
            self.schema
        }
    }

    fn reaches(&self, reference: &Reference) -> bool {
        self.schema.can_reach(reference, self.target)
            || self.output.can_reach(reference, self.target)
    }

    fn type_reaches(&self, ty: &Type) -> bool {
        self.schema.type_can_reach(ty, self.target)
            || self.output.type_can_reach(ty, self.target)
    }

    fn visit_reference(&self, reference: &Reference, value: &Value) -> FixResult<Option<Value>> {
        if !self.reaches(reference) {
            trace!(reference = %reference, target = %self.target, "pruned");
            return Ok(None);
        }

        let children = match self.schema.get_type(reference) {
            Some(Type::Choice(_)) => {
                let schema = self.schema_for(reference, value);
                let spec = TypedValue::new(schema, reference, value.clone()).field_spec();
                self.visit_fields(&spec, value)?
            }
            Some(ty) => self.visit_type(ty, value)?,
            None => None,
        };

        if reference != self.target {
            return Ok(children);
        }
        let current = children.as_ref().unwrap_or(value);
        match self.apply_here(reference, current)? {
            Some(rewritten) => Ok(Some(rewritten)),
            None => Ok(children),
        }
    }

    fn apply_here(&self, reference: &Reference, value: &Value) -> FixResult<Option<Value>> {
        match self.rule {
            Rule::Convert { f, .. } => f(value),
            Rule::Named { type_id, f, .. } => {
                let schema = self.schema_for(reference, value);
                let typed = TypedValue::new(schema, reference, value.clone());
                if !typed.is(type_id) {
                    return Ok(None);
                }
                trace!(reference = %reference, type_id = %type_id, "named rewrite");
                let record = f(typed.split())?;
                Ok(Some(typed.splice(record).into_value()))
            }
            Rule::Everywhere { f, .. } => {
                let schema = self.schema_for(reference, value);
                let typed = TypedValue::new(schema, reference, value.clone());
                Ok(Some(f(typed)?.into_value()))
            }
            Rule::Nop | Rule::Seq(_) => Ok(None),
        }
    }

    fn visit_type(&self, ty: &Type, value: &Value) -> FixResult<Option<Value>> {
        match ty {
            Type::Opaque => Ok(None),
            Type::Reference(reference) => self.visit_reference(reference, value),
            Type::List(inner) => self.visit_list(inner, value),
            Type::MapOf(inner) => self.visit_map_of(inner, value),
            Type::Fields(spec) => self.visit_fields(spec, value),
            Type::Choice(choice) => {
                let type_id = value
                    .field(choice.key())
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                match choice.variant(type_id) {
                    Some(spec) => self.visit_fields(spec, value),
                    None => Ok(None),
                }
            }
        }
    }

    fn visit_list(&self, inner: &Type, value: &Value) -> FixResult<Option<Value>> {
        let Value::List(items) = value else {
            return Ok(None);
        };
        if !self.type_reaches(inner) {
            return Ok(None);
        }
        let mut out: Option<docfix_value::List> = None;
        for (i, item) in items.iter().enumerate() {
            if let Some(next) = self.visit_type(inner, item)? {
                out.get_or_insert_with(|| items.clone()).set(i, next);
            }
        }
        Ok(out.map(Value::List))
    }

    fn visit_map_of(&self, inner: &Type, value: &Value) -> FixResult<Option<Value>> {
        let Value::Map(map) = value else {
            return Ok(None);
        };
        if !self.type_reaches(inner) {
            return Ok(None);
        }
        let mut out: Option<Map> = None;
        for (k, v) in map.iter() {
            if let Some(next) = self.visit_type(inner, v)? {
                out.get_or_insert_with(|| map.clone()).insert(k, next);
            }
        }
        Ok(out.map(Value::Map))
    }

    fn visit_fields(&self, spec: &FieldSpec, value: &Value) -> FixResult<Option<Value>> {
        let Value::Map(map) = value else {
            return Ok(None);
        };
        let mut out: Option<Map> = None;
        for (name, ty) in spec.iter() {
            let Some(v) = map.get(name) else {
                continue;
            };
            if let Some(next) = self.visit_type(ty, v)? {
                out.get_or_insert_with(|| map.clone()).insert(name, next);
            }
        }
        Ok(out.map(Value::Map))
    }
}
