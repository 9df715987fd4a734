//! Tests for persisting build artifacts.
mod common;
use common::*;
use kumitate::prelude::*;
use pretty_assertions::assert_eq;
use std::fs;

#[test]
fn test_artifacts_survive_save_and_load() {
    let artifacts = compile(create_fan_in_merge());
    let path = std::env::temp_dir().join(format!("kumitate-artifact-{}.bin", std::process::id()));
    let path = path.to_str().expect("temp path should be valid UTF-8");

    artifacts.save(path).expect("Failed to save artifacts");
    let loaded = BuildArtifacts::from_file(path).expect("Failed to load artifacts");
    let _ = fs::remove_file(path);

    assert_eq!(loaded, artifacts);
}

#[test]
fn test_loading_missing_file_fails() {
    let result = BuildArtifacts::from_file("/definitely/not/here/kumitate.bin");

    match result {
        Err(ArtifactError::Generic(message)) => assert!(message.contains("Could not open file")),
        Ok(_) => panic!("Expected an error for a missing file"),
    }
}

#[test]
fn test_corrupt_bytes_are_rejected() {
    let result = BuildArtifacts::from_bytes(&[0xff, 0xff, 0xff]);

    assert!(result.is_err());
}

#[test]
fn test_json_export_carries_tree_and_warnings() {
    let graph = graph(vec![
        node("Trigger", TRIGGER).connect("output0", "Join", 0),
        node("Join", MERGE),
    ]);
    let artifacts = compile(graph);

    let json = artifacts.to_json_pretty().expect("Failed to export JSON");
    let value: serde_json::Value = serde_json::from_str(&json).expect("export should be valid JSON");

    assert_eq!(value["variables"]["Join"], "join");
    assert_eq!(
        value["warnings"][0]["MergeWithTooFewInputs"]["node"],
        "Join"
    );
    assert!(value["roots"][0]["Sequence"].is_object());
}
