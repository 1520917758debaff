use super::{CatalogFix, FixMeta};
use crate::combinators::edit_records;
use crate::demo::DemoRefs;
use docfix_rewrite::Rule;
use docfix_schema::DataVersion;
use docfix_value::Value;

pub struct EntityUuidFix;

static META: FixMeta = FixMeta {
    key: "entity-uuid",
    name: "entity_uuid",
    version: DataVersion::new(15, 0),
    title: "UUID pairs to int arrays",
    description: "Pairs of 64-bit `*Most` / `*Least` fields become one array of four \
                  32-bit ints: entity and player `UUID`, arrow `Owner`, zombie \
                  `ConversionPlayer`. A pair with a zero half is removed.",
    references: &["entity", "player"],
};

impl CatalogFix for EntityUuidFix {
    fn meta(&self) -> &'static FixMeta {
        &META
    }

    fn rule(&self, refs: &DemoRefs) -> Rule {
        Rule::seq([
            edit_records(&refs.entity, None, |v| Ok(uuid_from_pair(v, "UUID", "UUID"))),
            edit_records(&refs.entity, Some("demo:arrow"), |v| {
                Ok(uuid_from_pair(v, "OwnerUUID", "Owner"))
            }),
            edit_records(&refs.entity, Some("demo:zombie"), |v| {
                Ok(uuid_from_pair(v, "ConversionPlayer", "ConversionPlayer"))
            }),
            edit_records(&refs.player, None, |v| Ok(uuid_from_pair(v, "UUID", "UUID"))),
        ])
    }
}

/// Replaces `{prefix}Most` / `{prefix}Least` with `new` as four big-endian i32 words.
pub(crate) fn uuid_from_pair(value: &Value, prefix: &str, new: &str) -> Value {
    let most_key = format!("{prefix}Most");
    let least_key = format!("{prefix}Least");
    if !value.has_field(&most_key) && !value.has_field(&least_key) {
        return value.clone();
    }
    let most = value.field(&most_key).map_or(0, |v| v.as_int(0));
    let least = value.field(&least_key).map_or(0, |v| v.as_int(0));
    let stripped = value.remove(&most_key).remove(&least_key);
    if most == 0 || least == 0 {
        return stripped;
    }
    stripped.set(new, Value::list_of(uuid_words(most, least).map(Value::from)))
}

fn uuid_words(most: i64, least: i64) -> [i32; 4] {
    [
        (most >> 32) as i32,
        most as i32,
        (least >> 32) as i32,
        least as i32,
    ]
}

#[cfg(test)]
mod tests {
    use super::{uuid_from_pair, uuid_words};
    use docfix_value::Value;
    use pretty_assertions::assert_eq;

    #[test]
    fn words_are_big_endian_halves() {
        assert_eq!(
            uuid_words(0x0000_0001_0000_0002, -1),
            [1, 2, -1, -1]
        );
    }

    #[test]
    fn pair_becomes_int_array() {
        let doc = Value::map_of([
            ("UUIDMost", Value::from(0x0000_0001_0000_0002_i64)),
            ("UUIDLeast", Value::from(0x0000_0003_0000_0004_i64)),
            ("Health", Value::from(10)),
        ]);
        assert_eq!(
            uuid_from_pair(&doc, "UUID", "UUID"),
            Value::map_of([
                ("Health", Value::from(10)),
                (
                    "UUID",
                    Value::list_of([1i32, 2, 3, 4].map(Value::from)),
                ),
            ])
        );
    }

    #[test]
    fn zero_half_drops_the_pair() {
        let doc = Value::map_of([("OwnerUUIDMost", Value::from(5)), ("OwnerUUIDLeast", Value::from(0))]);
        assert!(uuid_from_pair(&doc, "OwnerUUID", "Owner").is_empty_map());
    }

    #[test]
    fn absent_pair_is_untouched() {
        let doc = Value::map_of([("Owner", Value::from("someone"))]);
        assert_eq!(uuid_from_pair(&doc, "OwnerUUID", "Owner"), doc);
    }
}
