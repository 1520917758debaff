use docfix_schema::{DataVersion, FieldSpec, ReferenceRegistry, Schema, Shape, Type};
use pretty_assertions::assert_eq;

#[test]
fn chain_of_derived_schemas_accumulates_choices() {
    let mut registry = ReferenceRegistry::new();
    let block_entity = registry.register("block-entity", Shape::keyed("id")).unwrap();

    let v10 = Schema::build(10u32, None)
        .register_choice(&block_entity, Some("demo"))
        .add_choice(&block_entity, "chest", FieldSpec::opaque())
        .build()
        .unwrap();
    let v10_1 = Schema::build(DataVersion::new(10, 1), Some(&v10))
        .add_choice(&block_entity, "barrel", FieldSpec::opaque())
        .build()
        .unwrap();
    let v11 = Schema::same(11u32, &v10_1).unwrap();

    let ids: Vec<_> = v11
        .choice(&block_entity)
        .map(|c| c.ids().map(str::to_string).collect())
        .unwrap_or_default();
    assert_eq!(ids, vec!["demo:barrel".to_string(), "demo:chest".to_string()]);
    assert_eq!(v11.parent().map(|p| p.version()), Some(DataVersion::new(10, 1)));
    assert_eq!(v10.choice(&block_entity).map(|c| c.len()), Some(1));
}

#[test]
fn record_reference_resolves_declared_fields_regardless_of_id() {
    let mut registry = ReferenceRegistry::new();
    let player = registry.register("player", Shape::Record).unwrap();
    let schema = Schema::build(10u32, None)
        .register(
            &player,
            Type::Fields(FieldSpec::opaque().field("Inventory", Type::list(Type::Opaque))),
        )
        .build()
        .unwrap();

    let spec = schema.resolve(&player, Some("ignored")).unwrap();
    assert!(spec.contains("Inventory"));
    assert!(schema.choice_type(&player, "x").is_err());
}
