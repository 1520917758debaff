use super::{CatalogFix, FixMeta};
use crate::combinators::{ensure_namespaced_ids, rename_choices};
use crate::demo::DemoRefs;
use docfix_rewrite::Rule;
use docfix_schema::{DataVersion, FieldSpec, SchemaBuilder, Type};

pub struct BlockEntityRenameFix;

static META: FixMeta = FixMeta {
    key: "block-entity-rename",
    name: "block_entity_rename",
    version: DataVersion::new(14, 0),
    title: "Rename block entities",
    description: "Block entity ids are written with their namespace, and \
                  `demo:mob_spawner` / `demo:noteblock` become `demo:spawner` / \
                  `demo:note_block`.",
    references: &["block-entity"],
};

const RENAMES: &[(&str, &str)] = &[
    ("demo:mob_spawner", "demo:spawner"),
    ("demo:noteblock", "demo:note_block"),
];

impl CatalogFix for BlockEntityRenameFix {
    fn meta(&self) -> &'static FixMeta {
        &META
    }

    fn schema(&self, refs: &DemoRefs, schema: SchemaBuilder) -> SchemaBuilder {
        let block_entity = &refs.block_entity;
        schema
            .remove_choice(block_entity, "mob_spawner")
            .remove_choice(block_entity, "noteblock")
            .add_choice(
                block_entity,
                "spawner",
                FieldSpec::opaque().field("SpawnData", Type::reference(&refs.entity)),
            )
            .add_choice(block_entity, "note_block", FieldSpec::opaque())
    }

    fn rule(&self, refs: &DemoRefs) -> Rule {
        Rule::seq([
            ensure_namespaced_ids(&refs.block_entity),
            rename_choices(&refs.block_entity, RENAMES),
        ])
    }
}
