use super::{CatalogFix, FixMeta};
use crate::combinators::add_field_if_missing;
use crate::demo::DemoRefs;
use docfix_rewrite::Rule;
use docfix_schema::DataVersion;
use docfix_value::Value;

pub struct FishTypeFix;

static META: FixMeta = FixMeta {
    key: "fish-type",
    name: "fish_type_default",
    version: DataVersion::new(11, 0),
    title: "Default fish size",
    description: "Fish written before the size field existed get `type = \"medium\"`. \
                  Fish that already carry a size keep it.",
    references: &["entity"],
};

impl CatalogFix for FishTypeFix {
    fn meta(&self) -> &'static FixMeta {
        &META
    }

    fn rule(&self, refs: &DemoRefs) -> Rule {
        add_field_if_missing(&refs.entity, Some("demo:fish"), "type", Value::from("medium"))
    }
}
