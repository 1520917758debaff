use super::{CatalogFix, FixMeta};
use crate::combinators::add_flag_if_missing;
use crate::demo::DemoRefs;
use docfix_rewrite::Rule;
use docfix_schema::DataVersion;

pub struct RandomSequenceSettingsFix;

static META: FixMeta = FixMeta {
    key: "random-sequence-settings",
    name: "random_sequence_settings",
    version: DataVersion::new(15, 0),
    title: "Random sequence settings",
    description: "Saved random sequences gain `include_world_seed` and \
                  `include_sequence_id`, both true unless already set.",
    references: &["saved-data:random-sequences"],
};

impl CatalogFix for RandomSequenceSettingsFix {
    fn meta(&self) -> &'static FixMeta {
        &META
    }

    fn rule(&self, refs: &DemoRefs) -> Rule {
        add_flag_if_missing(&refs.random_sequences, "include_world_seed", true)
            .then(add_flag_if_missing(&refs.random_sequences, "include_sequence_id", true))
    }
}
