use super::{CatalogFix, FixMeta};
use crate::combinators::{EnumTable, split_choice};
use crate::demo::{DemoRefs, living};
use docfix_rewrite::Rule;
use docfix_schema::{DataVersion, SchemaBuilder};

pub struct SkeletonSplitFix;

static META: FixMeta = FixMeta {
    key: "skeleton-split",
    name: "skeleton_split",
    version: DataVersion::new(12, 0),
    title: "Split skeleton variants",
    description: "The integer `variant` field of `demo:skeleton` becomes its own type-id: \
                  1 is `demo:wither_skeleton`, 2 is `demo:stray`. The field is removed; \
                  other variants stay plain skeletons.",
    references: &["entity"],
};

impl CatalogFix for SkeletonSplitFix {
    fn meta(&self) -> &'static FixMeta {
        &META
    }

    fn schema(&self, refs: &DemoRefs, schema: SchemaBuilder) -> SchemaBuilder {
        schema
            .add_choice(&refs.entity, "wither_skeleton", living(refs))
            .add_choice(&refs.entity, "stray", living(refs))
    }

    fn rule(&self, refs: &DemoRefs) -> Rule {
        split_choice(
            &refs.entity,
            "demo:skeleton",
            "variant",
            EnumTable::new(&[(1, "demo:wither_skeleton"), (2, "demo:stray")]),
        )
    }
}
