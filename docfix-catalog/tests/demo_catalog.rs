use docfix_catalog::DemoCatalog;
use docfix_schema::DataVersion;
use docfix_value::Value;
use pretty_assertions::assert_eq;
use serde_json::json;

fn migrate(reference: &str, doc: serde_json::Value, stored: u32) -> (serde_json::Value, DataVersion) {
    let catalog = DemoCatalog::build().unwrap();
    let reference = catalog.reference(reference).unwrap();
    let out = catalog
        .pipeline()
        .migrate(reference, Value::from(doc), stored)
        .unwrap();
    (serde_json::Value::from(&out.value), out.version)
}

fn migrate_to(reference: &str, doc: serde_json::Value, stored: u32, target: u32) -> serde_json::Value {
    let catalog = DemoCatalog::build().unwrap();
    let reference = catalog.reference(reference).unwrap();
    let out = catalog
        .pipeline()
        .migrate_to(reference, Value::from(doc), stored, target)
        .unwrap();
    serde_json::Value::from(&out.value)
}

#[test]
fn fish_with_a_size_keeps_it() {
    let doc = json!({"id": "demo:fish", "type": "large"});
    assert_eq!(migrate_to("entity", doc.clone(), 10, 11), doc);
}

#[test]
fn fish_without_a_size_gets_medium() {
    let (out, version) = migrate("entity", json!({"id": "demo:fish"}), 10);
    assert_eq!(out, json!({"id": "demo:fish", "type": "medium"}));
    assert_eq!(version, DataVersion::from(15u32));
}

#[test]
fn stray_skeleton_keeps_its_fields() {
    let doc = json!({
        "id": "demo:skeleton",
        "variant": 2,
        "Health": 20,
        "HandItems": [{"id": "demo:bow", "Count": 1}],
    });
    let out = migrate_to("entity", doc, 11, 12);
    assert_eq!(
        out,
        json!({
            "id": "demo:stray",
            "Health": 20,
            "HandItems": [{"id": "demo:bow", "Count": 1}],
        })
    );
}

#[test]
fn skeleton_riding_under_a_player_is_split() {
    let doc = json!({
        "Name": "alex",
        "RootVehicle": {"Entity": {"id": "skeleton", "variant": 1}},
    });
    let out = migrate_to("player", doc, 11, 12);
    assert_eq!(
        out,
        json!({
            "Name": "alex",
            "RootVehicle": {"Entity": {"id": "demo:wither_skeleton"}},
        })
    );
}

#[test]
fn current_documents_are_untouched() {
    let doc = json!({
        "id": "demo:skeleton",
        "variant": 2,
        "UUIDMost": 1,
        "UUIDLeast": 2,
    });
    let (out, version) = migrate("entity", doc.clone(), 15);
    assert_eq!(out, doc);
    assert_eq!(version, DataVersion::from(15u32));
}

#[test]
fn unknown_entity_ids_pass_through() {
    let doc = json!({"id": "mod:walrus", "variant": 2, "Tusks": [1, 2]});
    let (out, _) = migrate("entity", doc.clone(), 10);
    assert_eq!(out, doc);
}

#[test]
fn effects_in_a_chest_item_are_remapped_and_chest_is_namespaced() {
    let doc = json!({
        "id": "chest",
        "Items": [{
            "id": "demo:spawn_egg",
            "tag": {"EntityTag": {
                "id": "demo:pig",
                "ActiveEffects": [{"Id": 1, "Amplifier": 0, "Duration": 200}],
            }},
        }],
    });
    let (out, _) = migrate("block-entity", doc, 12);
    assert_eq!(
        out,
        json!({
            "id": "demo:chest",
            "Items": [{
                "id": "demo:spawn_egg",
                "tag": {"EntityTag": {
                    "id": "demo:pig",
                    "active_effects": [{"id": "demo:speed", "amplifier": 0, "duration": 200}],
                }},
            }],
        })
    );
}

#[test]
fn beacon_and_mooshroom_effects() {
    let beacon = json!({"id": "demo:beacon", "Primary": 3, "Secondary": 77, "Levels": 4});
    assert_eq!(
        migrate_to("block-entity", beacon, 12, 13),
        json!({"id": "demo:beacon", "primary_effect": "demo:haste", "Levels": 4})
    );

    let cow = json!({"id": "demo:mooshroom", "EffectId": 14, "EffectDuration": 60});
    assert_eq!(
        migrate_to("entity", cow, 12, 13),
        json!({"id": "demo:mooshroom", "stew_effects": [{"id": "demo:invisibility", "duration": 60}]})
    );
}

#[test]
fn spawner_rename_keeps_spawn_data_typed() {
    let doc = json!({
        "id": "demo:mob_spawner",
        "SpawnData": {"id": "demo:zombie", "UUIDMost": 4294967296i64, "UUIDLeast": 7},
    });
    let (out, _) = migrate("block-entity", doc, 13);
    assert_eq!(
        out,
        json!({
            "id": "demo:spawner",
            "SpawnData": {"id": "demo:zombie", "UUID": [1, 0, 0, 7]},
        })
    );
}

#[test]
fn arrow_owner_and_player_uuid() {
    let arrow = json!({"id": "demo:arrow", "OwnerUUIDMost": -1, "OwnerUUIDLeast": 2});
    assert_eq!(
        migrate_to("entity", arrow, 14, 15),
        json!({"id": "demo:arrow", "Owner": [-1, -1, 0, 2]})
    );

    let player = json!({"UUIDMost": 3, "UUIDLeast": 0, "Inventory": []});
    assert_eq!(migrate_to("player", player, 14, 15), json!({"Inventory": []}));
}

#[test]
fn random_sequences_gain_flags() {
    let doc = json!({"sequences": {}, "include_world_seed": false});
    let (out, _) = migrate("saved-data:random-sequences", doc, 14);
    assert_eq!(
        out,
        json!({"sequences": {}, "include_world_seed": false, "include_sequence_id": true})
    );
}
