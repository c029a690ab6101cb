use std::fs;

use aeronull::{HostStore, StoreError};

#[test]
fn add_and_delete_keep_counts() {
    let td = tempfile::tempdir().unwrap();
    let store = HostStore::in_root(td.path());
    assert!(store.load().unwrap().is_empty());

    store.add("10.0.0.5", "root", "a").unwrap();
    store.add("10.0.0.6", "deploy", "b").unwrap();
    store.add("10.0.0.7", "root", "c").unwrap();
    assert_eq!(store.load().unwrap().len(), 3);

    let removed = store.remove(1).unwrap();
    assert_eq!(removed.name, "ssh deploy@10.0.0.6");
    let names: Vec<String> = store.load().unwrap().into_iter().map(|h| h.name).collect();
    assert_eq!(names, vec!["ssh root@10.0.0.5", "ssh root@10.0.0.7"]);
}

#[test]
fn reload_is_idempotent() {
    let td = tempfile::tempdir().unwrap();
    let store = HostStore::in_root(td.path());
    store.add("10.0.0.5", "root", "pw").unwrap();

    let before = fs::read_to_string(store.path()).unwrap();
    let first = store.load().unwrap();
    store.save(&first).unwrap();
    let second = store.load().unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(store.path()).unwrap(), before);
}

#[test]
fn file_is_a_pretty_printed_array() {
    let td = tempfile::tempdir().unwrap();
    let store = HostStore::in_root(td.path());
    store.add("10.0.0.5", "root", "pw").unwrap();
    let text = fs::read_to_string(td.path().join(".vps_config.json")).unwrap();
    assert!(text.starts_with("[\n"), "{text}");
    let v: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(v[0]["name"], "ssh root@10.0.0.5");
    assert_eq!(v[0]["password"], "pw");
}

#[test]
fn corrupt_file_is_a_parse_error() {
    let td = tempfile::tempdir().unwrap();
    let store = HostStore::in_root(td.path());
    fs::write(store.path(), "{ nope").unwrap();
    let err = store.load().unwrap_err();
    assert!(matches!(err, StoreError::Parse { .. }), "{err}");
    assert!(store.add("10.0.0.5", "root", "x").is_err());
    assert_eq!(fs::read_to_string(store.path()).unwrap(), "{ nope");
}
