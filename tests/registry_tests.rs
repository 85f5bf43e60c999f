use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use dataset_registry::data::{
    DatasetPatch, DatasetRegistry, ErrorKind, NewDataset, RegistryError,
};
use serde_json::{json, Value};
use tempfile::TempDir;

fn registry_with(contents: impl AsRef<[u8]>) -> (TempDir, DatasetRegistry) {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let path = dir.path().join("model_parameters.json");
    fs::write(&path, contents).expect("fixture should be written");
    (dir, DatasetRegistry::new(path))
}

fn read_file(path: &Path) -> Value {
    let raw = fs::read_to_string(path).expect("registry file should be readable");
    serde_json::from_str(&raw).expect("registry file should be valid json")
}

fn kind_of<T: std::fmt::Debug>(result: Result<T, RegistryError>) -> ErrorKind {
    result.expect_err("operation should fail").kind()
}

#[test]
fn add_then_get_round_trips_exactly() {
    let (_dir, registry) = registry_with("{}");

    let added = registry
        .add("iris", NewDataset::new("iris", "http://x"))
        .expect("add should succeed");
    assert_eq!(added.message, "Dataset 'iris' added successfully.");

    let fetched = registry.get("iris").expect("get should succeed");
    assert_eq!(fetched.data.into_value(), json!({"name": "iris", "url": "http://x"}));
    assert_eq!(fetched.message, "Dataset 'iris' found.");
}

#[test]
fn add_on_existing_name_conflicts_and_keeps_entry() {
    let (_dir, registry) =
        registry_with(r#"{"iris": {"name": "iris", "url": "http://x", "rows": 150}}"#);
    let before = fs::read_to_string(registry.path()).expect("read");

    let err = registry
        .add("iris", NewDataset::new("other", "http://y"))
        .expect_err("duplicate add should fail");
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(err.to_string(), "Dataset 'iris' already exists.");

    assert_eq!(fs::read_to_string(registry.path()).expect("read"), before);
}

#[test]
fn update_merges_and_keeps_untouched_fields() {
    let (_dir, registry) =
        registry_with(r#"{"iris": {"name": "iris", "url": "http://x", "extra": "keep"}}"#);

    let updated = registry
        .update("iris", DatasetPatch::new().set("url", "http://y"))
        .expect("update should succeed");

    assert_eq!(updated.message, "Dataset 'iris' updated successfully.");
    assert_eq!(
        updated.data.into_value(),
        json!({"name": "iris", "url": "http://y", "extra": "keep"})
    );
    assert_eq!(
        read_file(registry.path()),
        json!({"iris": {"name": "iris", "url": "http://y", "extra": "keep"}})
    );
}

#[test]
fn update_can_add_new_fields_of_any_type() {
    let (_dir, registry) = registry_with(r#"{"iris": {"name": "iris", "url": "http://x"}}"#);

    let patch = DatasetPatch::new()
        .set("rows", 150)
        .set("public", true)
        .set("columns", json!(["sepal_length", "species"]));
    let updated = registry.update("iris", patch).expect("update should succeed");

    assert_eq!(updated.data.get("rows"), Some(&json!(150)));
    assert_eq!(updated.data.get("public"), Some(&json!(true)));
    assert_eq!(updated.data.name(), Some("iris"));
}

#[test]
fn empty_patch_leaves_entry_unchanged() {
    let (_dir, registry) = registry_with(r#"{"iris": {"name": "iris", "url": "http://x"}}"#);
    let updated = registry
        .update("iris", DatasetPatch::new())
        .expect("update should succeed");
    assert_eq!(updated.data.into_value(), json!({"name": "iris", "url": "http://x"}));
}

#[test]
fn missing_names_are_not_found() {
    let (_dir, registry) = registry_with(r#"{"iris": {"name": "iris", "url": "http://x"}}"#);

    let err = registry.get("nonexistent").expect_err("get should fail");
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(err.to_string().contains("'nonexistent'"));

    assert_eq!(
        kind_of(registry.update("nonexistent", DatasetPatch::new().set("url", "http://y"))),
        ErrorKind::NotFound
    );
}

#[test]
fn list_on_empty_collection_is_not_found() {
    let (_dir, registry) = registry_with("{}");
    let err = registry.list().expect_err("list should fail");
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.to_string(), "No datasets available in the configuration.");
}

#[test]
fn corrupt_file_fails_every_operation() {
    let cases: [&[u8]; 5] = [
        b"{not json",
        b"[1, 2, 3]",
        b"42",
        br#"{"iris": "http://x"}"#,
        b"{\"iris\": {\"name\": \"\xff\xfe\", \"url\": \"x\"}}",
    ];
    for contents in cases {
        let (_dir, registry) = registry_with(contents);
        assert_eq!(
            kind_of(registry.list()),
            ErrorKind::ConfigurationCorrupt,
            "{}",
            String::from_utf8_lossy(contents)
        );
        assert_eq!(kind_of(registry.get("iris")), ErrorKind::ConfigurationCorrupt);
        assert_eq!(
            kind_of(registry.add("wine", NewDataset::new("wine", "http://w"))),
            ErrorKind::ConfigurationCorrupt
        );
        assert_eq!(
            kind_of(registry.update("iris", DatasetPatch::new().set("url", "http://y"))),
            ErrorKind::ConfigurationCorrupt
        );
        assert_eq!(fs::read(registry.path()).expect("read"), contents);
    }
}

#[test]
fn missing_file_fails_every_operation_and_is_never_created() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path: PathBuf = dir.path().join("absent.json");
    let registry = DatasetRegistry::new(&path);

    assert_eq!(kind_of(registry.list()), ErrorKind::ConfigurationMissing);
    assert_eq!(kind_of(registry.get("iris")), ErrorKind::ConfigurationMissing);
    assert_eq!(
        kind_of(registry.add("iris", NewDataset::new("iris", "http://x"))),
        ErrorKind::ConfigurationMissing
    );
    assert_eq!(
        kind_of(registry.update("iris", DatasetPatch::new())),
        ErrorKind::ConfigurationMissing
    );
    assert!(!path.exists());
}

#[test]
fn list_and_get_are_idempotent() {
    let (_dir, registry) = registry_with(
        r#"{"iris": {"name": "iris", "url": "http://x"}, "wine": {"name": "wine", "url": "http://w"}}"#,
    );
    let before = fs::read_to_string(registry.path()).expect("read");

    assert_eq!(registry.list().expect("list"), registry.list().expect("list"));
    assert_eq!(registry.get("wine").expect("get"), registry.get("wine").expect("get"));
    assert_eq!(fs::read_to_string(registry.path()).expect("read"), before);
}

#[test]
fn changes_survive_a_fresh_registry() {
    let (_dir, registry) = registry_with(r#"{"iris": {"name": "iris", "url": "http://x"}}"#);
    registry
        .add("wine", NewDataset::new("wine", "http://w"))
        .expect("add should succeed");
    registry
        .update("iris", DatasetPatch::new().set("url", "http://y"))
        .expect("update should succeed");

    let reopened = DatasetRegistry::new(registry.path());
    let listed = reopened.list().expect("list should succeed");
    assert_eq!(listed.message, "All datasets");
    assert_eq!(listed.data.len(), 2);
    assert_eq!(
        reopened.get("iris").expect("get").data.url(),
        Some("http://y")
    );
    assert_eq!(
        reopened.get("wine").expect("get").data.into_value(),
        json!({"name": "wine", "url": "http://w"})
    );
}

#[test]
fn rewrites_keep_existing_order_and_append_new_names() {
    let (_dir, registry) = registry_with(
        r#"{"zoo": {"name": "zoo", "url": "z"}, "abalone": {"name": "abalone", "url": "a"}}"#,
    );
    registry
        .add("iris", NewDataset::new("iris", "http://x"))
        .expect("add should succeed");

    let listed = registry.list().expect("list should succeed");
    let names: Vec<&str> = listed.data.names().collect();
    assert_eq!(names, vec!["zoo", "abalone", "iris"]);

    let raw = fs::read_to_string(registry.path()).expect("read");
    assert!(raw.starts_with("{\n    \"zoo\": {\n        \"name\": \"zoo\","));
}

#[test]
fn untouched_numbers_survive_a_rewrite_digit_for_digit() {
    let (_dir, registry) = registry_with(
        r#"{"iris": {"name": "iris", "url": "http://x", "id": 123456789012345678901234567890, "ratio": 0.1000000000000000055511151231257827}}"#,
    );
    registry
        .update("iris", DatasetPatch::new().set("url", "http://y"))
        .expect("update should succeed");
    registry
        .add("wine", NewDataset::new("wine", "http://w"))
        .expect("add should succeed");

    let raw = fs::read_to_string(registry.path()).expect("read");
    assert!(raw.contains("\"id\": 123456789012345678901234567890,"), "{raw}");
    assert!(raw.contains("\"ratio\": 0.1000000000000000055511151231257827\n"), "{raw}");
    assert!(raw.contains("\"url\": \"http://y\""));
}

// Add/update hold the registry's write lock across read-modify-write, so
// concurrent writers through one registry never lose each other's entries.
#[test]
fn concurrent_adds_through_one_registry_all_survive() {
    let (_dir, registry) = registry_with("{}");
    let registry = Arc::new(registry);

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let name = format!("dataset_{i}");
                registry
                    .add(&name, NewDataset::new(name.clone(), format!("http://host/{i}")))
                    .expect("add should succeed");
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("writer thread should not panic");
    }

    let listed = registry.list().expect("list should succeed");
    assert_eq!(listed.data.len(), 16);
    for i in 0..16 {
        assert!(listed.data.contains(&format!("dataset_{i}")));
    }
}

#[test]
fn concurrent_updates_of_different_fields_all_survive() {
    let (_dir, registry) = registry_with(r#"{"iris": {"name": "iris", "url": "http://x"}}"#);
    let registry = Arc::new(registry);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                registry
                    .update("iris", DatasetPatch::new().set(format!("field_{i}"), i))
                    .expect("update should succeed");
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("writer thread should not panic");
    }

    let entry = registry.get("iris").expect("get should succeed").data;
    assert_eq!(entry.fields().len(), 10);
}
