use std::collections::{BTreeSet, HashSet};
use typemap_core::graph::TypeGraph;
use typemap_core::key::TypeKey;
use typemap_core::scan::scan;
use typemap_core::source::StaticSource;
use typemap_core::store::{self, StoreError};
use tempfile::TempDir;

fn key(name: &str) -> TypeKey {
    TypeKey::new(name, "m")
}

fn scanned() -> TypeGraph {
    let source = StaticSource::new()
        .with_subtypes(TypeKey::object(), [key("A"), key("B")])
        .with_subtypes(key("A"), [key("C")])
        .with_subtypes(key("B"), [key("C")]);
    scan(&source, &TypeKey::object(), &HashSet::new())
}

#[test]
fn test_save_and_load_roundtrip() {
    let tmp = TempDir::new().unwrap();
    let path = store::default_path(tmp.path());
    let graph = scanned();

    store::save(&path, &graph, &TypeKey::object()).unwrap();
    assert!(path.exists());

    let (loaded, root) = store::load(&path).unwrap();
    assert_eq!(loaded, graph);
    assert_eq!(root, TypeKey::object());
}

#[test]
fn test_document_shape() {
    let json = store::to_json(&scanned(), &TypeKey::object()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["start"], "object builtins");
    assert_eq!(value["version"], "1");
    assert_eq!(
        value["relationships"]["object builtins"],
        serde_json::json!(["A m", "B m"])
    );
    assert_eq!(value["relationships"]["C m"], serde_json::json!([]));
}

#[test]
fn test_reads_legacy_field_name_without_version() {
    let json = r#"{
        "start": "object builtins",
        "object_relationships": {
            "object builtins": ["int builtins", "type builtins"],
            "int builtins": ["bool builtins"],
            "bool builtins": [],
            "type builtins": []
        }
    }"#;
    let (graph, root) = store::from_json(json).unwrap();
    assert_eq!(root, TypeKey::object());
    assert_eq!(graph.len(), 4);
    assert_eq!(
        graph.children(&TypeKey::new("int", "builtins")),
        Some(&BTreeSet::from([TypeKey::new("bool", "builtins")]))
    );
}

#[test]
fn test_version_mismatch() {
    let json = r#"{"version": "9", "start": "object builtins", "relationships": {}}"#;
    assert!(matches!(
        store::from_json(json),
        Err(StoreError::Version { .. })
    ));
}

#[test]
fn test_invalid_key_is_reported() {
    let json = r#"{"start": "object", "relationships": {}}"#;
    assert!(matches!(
        store::from_json(json),
        Err(StoreError::InvalidKey(_))
    ));
}

#[test]
fn test_load_nonexistent_is_io_error() {
    let tmp = TempDir::new().unwrap();
    let result = store::load(&tmp.path().join("missing.json"));
    assert!(matches!(result, Err(StoreError::Io { .. })));
}

#[test]
fn test_garbage_is_decode_error() {
    assert!(matches!(
        store::from_json("not json"),
        Err(StoreError::Decode(_))
    ));
}

#[test]
fn test_roundtrip_keeps_spaced_module() {
    let parent = TypeKey::try_new("Base", "my pkg.models").unwrap();
    let child = TypeKey::try_new("Leaf", "my pkg.models").unwrap();
    let source = StaticSource::new()
        .with_subtypes(TypeKey::object(), [parent.clone()])
        .with_subtypes(parent.clone(), [child.clone()]);
    let graph = scan(&source, &TypeKey::object(), &HashSet::new());

    let json = store::to_json(&graph, &TypeKey::object()).unwrap();
    let (loaded, _) = store::from_json(&json).unwrap();
    assert_eq!(loaded, graph);
    assert!(loaded.children(&parent).unwrap().contains(&child));
}

#[test]
fn test_refuses_to_save_name_with_space() {
    let tmp = TempDir::new().unwrap();
    let path = store::default_path(tmp.path());
    let source = StaticSource::new().with_subtypes(TypeKey::object(), [TypeKey::new("My Type", "zoo")]);
    let graph = scan(&source, &TypeKey::object(), &HashSet::new());

    assert!(matches!(
        store::save(&path, &graph, &TypeKey::object()),
        Err(StoreError::InvalidKey(_))
    ));
    assert!(!path.exists(), "nothing is written for an unpersistable graph");
}

#[test]
fn test_refuses_to_save_blank_module() {
    let source = StaticSource::new().with_subtypes(TypeKey::object(), [TypeKey::new("X", "")]);
    let graph = scan(&source, &TypeKey::object(), &HashSet::new());
    assert!(matches!(
        store::to_json(&graph, &TypeKey::object()),
        Err(StoreError::InvalidKey(_))
    ));

    let mut padded = TypeGraph::new();
    padded.insert(TypeKey::new("Y", " zoo"), BTreeSet::new());
    assert!(matches!(
        store::to_json(&padded, &TypeKey::new("Y", " zoo")),
        Err(StoreError::InvalidKey(_))
    ));
}
