//! Property-based tests for remainder preservation in the rewrite engine.
//!
//! These tests verify that:
//! - Keys a rule does not touch come back with the same value and relative order
//! - A rule targeting another type-id leaves the document identical
//! - Splitting and splicing an unedited record is the identity

use docfix_rewrite::{Rule, TypedValue, apply_rule};
use docfix_schema::{FieldSpec, Reference, ReferenceRegistry, Schema, Shape, Type};
use docfix_value::{Map, Value};
use proptest::prelude::*;
use std::sync::Arc;

fn setup() -> (Arc<Schema>, Reference) {
    let mut registry = ReferenceRegistry::new();
    let entity = registry.register("entity", Shape::keyed("id")).unwrap();
    let schema = Schema::build(10u32, None)
        .register_choice(&entity, Some("demo"))
        .add_choice(
            &entity,
            "demo:fish",
            FieldSpec::opaque().field("type", Type::Opaque),
        )
        .add_choice(&entity, "demo:zombie", FieldSpec::opaque())
        .build()
        .unwrap();
    (schema, entity)
}

fn arb_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::Int),
        any::<bool>().prop_map(Value::Bool),
        "[a-z]{0,6}".prop_map(Value::from),
        Just(Value::Null),
    ]
}

/// Extra keys never collide with the tag or the declared field.
fn arb_extra() -> impl Strategy<Value = Vec<(String, Value)>> {
    prop::collection::vec(("[A-Z][a-zA-Z]{0,6}", arb_leaf()), 0..8)
}

fn fish_with(extra: &[(String, Value)]) -> Value {
    let mut map: Map = extra.iter().cloned().collect();
    map.insert("id", Value::from("fish"));
    Value::Map(map)
}

fn keys(v: &Value) -> Vec<String> {
    v.as_map()
        .map(|m| m.keys().map(str::to_string).collect())
        .unwrap_or_default()
}

proptest! {
    /// Adding a declared field keeps every remainder key in place.
    #[test]
    fn remainder_survives_targeted_rewrite(extra in arb_extra()) {
        let (schema, entity) = setup();
        let doc = fish_with(&extra);
        let rule = Rule::named(&entity, "demo:fish", |r| {
            if r.contains("type") {
                Ok(r)
            } else {
                let mut r = r;
                r.fields.insert("type", Value::from("medium"));
                Ok(r)
            }
        });

        let out = apply_rule(&rule, &schema, &entity, &doc).unwrap();

        let mut expected = keys(&doc);
        expected.push("type".to_string());
        prop_assert_eq!(keys(&out), expected);
        for (k, v) in doc.as_map().unwrap().iter() {
            prop_assert_eq!(out.field(k), Some(v));
        }
    }

    /// Rules for another type-id are the identity.
    #[test]
    fn other_type_ids_are_untouched(extra in arb_extra()) {
        let (schema, entity) = setup();
        let doc = fish_with(&extra);
        let rule = Rule::named(&entity, "demo:zombie", |r| Ok(r.set("Touched", Value::Null)));
        let out = apply_rule(&rule, &schema, &entity, &doc).unwrap();
        prop_assert_eq!(keys(&out), keys(&doc));
        prop_assert_eq!(out, doc);
    }

    /// split followed by splice reconstructs the document exactly.
    #[test]
    fn split_splice_is_identity(extra in arb_extra()) {
        let (schema, entity) = setup();
        let doc = fish_with(&extra);
        let typed = TypedValue::new(&schema, &entity, doc.clone());
        let back = typed.splice(typed.split()).into_value();
        prop_assert_eq!(keys(&back), keys(&doc));
        prop_assert_eq!(back, doc);
    }
}
