//! CLI behaviour and argument edge case tests.

#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn docfix() -> Command {
    Command::cargo_bin("docfix").expect("docfix binary")
}

fn write(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).unwrap();
}

fn stdout_json(output: &[u8]) -> serde_json::Value {
    serde_json::from_slice(output).expect("stdout is JSON")
}

#[test]
fn migrate_prints_a_single_document() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "fish.json", r#"{"id": "demo:fish", "DataVersion": 10}"#);

    let assert = docfix()
        .current_dir(temp.path())
        .args(["migrate", "fish.json", "--reference", "entity"])
        .assert()
        .success()
        .stderr(predicate::str::contains("1 migrated, 0 unchanged, 0 failed"));

    assert_eq!(
        stdout_json(&assert.get_output().stdout),
        serde_json::json!({"id": "demo:fish", "DataVersion": 15, "type": "medium"})
    );
    // Dry run leaves the file alone.
    assert!(fs::read_to_string(temp.path().join("fish.json")).unwrap().contains("10"));
}

#[test]
fn migrate_respects_from_to_and_no_stamp() {
    let temp = TempDir::new().unwrap();
    write(
        temp.path(),
        "skeleton.json",
        r#"{"id": "demo:skeleton", "variant": 2, "Health": 20}"#,
    );

    let assert = docfix()
        .current_dir(temp.path())
        .args([
            "migrate",
            "skeleton.json",
            "--reference",
            "entity",
            "--from",
            "11",
            "--to",
            "12",
            "--no-stamp",
            "--compact",
        ])
        .assert()
        .success();

    assert_eq!(
        String::from_utf8(assert.get_output().stdout.clone()).unwrap(),
        "{\"id\":\"demo:stray\",\"Health\":20}\n"
    );
}

#[test]
fn migrate_write_rewrites_changed_files_only() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "old.json", r#"{"id": "demo:fish", "DataVersion": 10}"#);
    let current = r#"{"id": "demo:fish", "DataVersion": 15}"#;
    write(temp.path(), "new.json", current);

    docfix()
        .current_dir(temp.path())
        .args(["migrate", ".", "--reference", "entity", "--write", "--compact"])
        .assert()
        .success()
        .stdout(predicate::str::contains("migrated  ./old.json (10 -> 15, 7 fixes)"))
        .stdout(predicate::str::contains("unchanged ./new.json (15)"));

    assert_eq!(
        fs::read_to_string(temp.path().join("old.json")).unwrap(),
        "{\"id\":\"demo:fish\",\"DataVersion\":15,\"type\":\"medium\"}\n"
    );
    assert_eq!(fs::read_to_string(temp.path().join("new.json")).unwrap(), current);
}

#[test]
fn migrate_out_dir_copies_results() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "pig.json", r#"{"id": "demo:pig", "DataVersion": 14}"#);

    docfix()
        .current_dir(temp.path())
        .args(["migrate", "pig.json", "--reference", "entity", "--out-dir", "out"])
        .assert()
        .success();

    let out = fs::read_to_string(temp.path().join("out").join("pig.json")).unwrap();
    assert_eq!(
        serde_json::from_str::<serde_json::Value>(&out).unwrap(),
        serde_json::json!({"id": "demo:pig", "DataVersion": 15})
    );
}

#[test]
fn failed_documents_exit_with_2() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "good.json", r#"{"id": "demo:fish", "DataVersion": 10}"#);
    write(temp.path(), "broken.json", "{ nope");

    docfix()
        .current_dir(temp.path())
        .args(["migrate", "good.json", "broken.json", "--reference", "entity"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("==> good.json <=="))
        .stderr(predicate::str::contains("error: broken.json"))
        .stderr(predicate::str::contains("1 migrated, 0 unchanged, 1 failed"));
}

#[test]
fn missing_version_uses_default_version() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "fish.json", r#"{"id": "demo:fish"}"#);

    docfix()
        .current_dir(temp.path())
        .args(["migrate", "fish.json", "--reference", "entity"])
        .assert()
        .code(2);

    docfix()
        .current_dir(temp.path())
        .args([
            "migrate",
            "fish.json",
            "--reference",
            "entity",
            "--default-version",
            "10",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("medium"));
}

#[test]
fn config_file_supplies_reference() {
    let temp = TempDir::new().unwrap();
    write(
        temp.path(),
        "docfix.toml",
        "[migrate]\nreference = \"entity\"\nstamp_version = false\n",
    );
    write(temp.path(), "fish.json", r#"{"id": "demo:fish", "DataVersion": 10}"#);

    let assert = docfix()
        .current_dir(temp.path())
        .args(["migrate", "fish.json"])
        .assert()
        .success();
    assert_eq!(
        stdout_json(&assert.get_output().stdout),
        serde_json::json!({"id": "demo:fish", "DataVersion": 10, "type": "medium"})
    );
}

#[test]
fn unknown_reference_is_a_tool_error() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "x.json", "{}");

    docfix()
        .current_dir(temp.path())
        .args(["migrate", "x.json", "--reference", "chunk"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unknown reference `chunk`"));
}

#[test]
fn migrate_requires_files() {
    docfix()
        .args(["migrate", "--reference", "entity"])
        .assert()
        .failure();
}

#[test]
fn invalid_version_is_rejected_by_the_parser() {
    docfix()
        .args(["migrate", "a.json", "--reference", "entity", "--from", "eleven"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid data version"));
}

#[test]
fn list_fixes_text() {
    docfix()
        .arg("list-fixes")
        .assert()
        .success()
        .stdout(predicate::str::contains("fish-type"))
        .stdout(predicate::str::contains("12.1"))
        .stdout(predicate::str::contains("docfix explain <key>"));
}

#[test]
fn list_fixes_json() {
    let assert = docfix()
        .args(["list-fixes", "--format", "json"])
        .assert()
        .success();
    let fixes = stdout_json(&assert.get_output().stdout);
    let keys: Vec<_> = fixes
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["key"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(
        keys,
        vec![
            "fish-type",
            "skeleton-split",
            "new-mobs",
            "mob-effect-id",
            "block-entity-rename",
            "entity-uuid",
            "random-sequence-settings",
        ]
    );
    assert_eq!(fixes[2]["version"], "12.1");
}

#[test]
fn explain_known_and_unknown_keys() {
    docfix()
        .args(["explain", "mob_effect_id"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Key:      mob-effect-id"))
        .stdout(predicate::str::contains("Schemas:  12.1 -> 13"));

    docfix()
        .args(["explain", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown fix key"));
}
