use super::{CatalogFix, FixMeta};
use crate::combinators::add_new_choices;
use crate::demo::DemoRefs;
use docfix_rewrite::Rule;
use docfix_schema::{DataVersion, SchemaBuilder};

pub struct NewMobsFix;

static META: FixMeta = FixMeta {
    key: "new-mobs",
    name: "new_mobs",
    version: DataVersion::new(12, 1),
    title: "Register new mobs",
    description: "Adds `demo:armadillo` and `demo:breeze` to the entity schema. \
                  No stored data changes.",
    references: &["entity"],
};

impl CatalogFix for NewMobsFix {
    fn meta(&self) -> &'static FixMeta {
        &META
    }

    fn schema(&self, refs: &DemoRefs, schema: SchemaBuilder) -> SchemaBuilder {
        add_new_choices(schema, &refs.entity, &["armadillo", "breeze"])
    }

    fn rule(&self, _refs: &DemoRefs) -> Rule {
        Rule::Nop
    }
}
