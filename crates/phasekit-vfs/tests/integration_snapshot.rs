//! Integration tests for persisting VFS snapshots to disk.

use phasekit_vfs::{Vfs, VfsBuilder, VfsGroup, VfsSnapshot};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_snapshot_survives_json_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("snapshot.json");

    let mut vfs = VfsBuilder::new()
        .add_file("/gen/a.ts", "export const a = 1;")
        .add_runtime("/rt/index.js", "export {};")
        .add_builtin("phasekit:manifest", "/.phasekit/manifest.json", "{}")
        .build()
        .unwrap();
    vfs.remove("/gen/old.ts").unwrap();

    fs::write(&path, serde_json::to_vec_pretty(&vfs.snapshot()).unwrap()).unwrap();

    let snapshot: VfsSnapshot = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
    let mut restored = Vfs::new();
    restored.restore(&snapshot).unwrap();

    assert_eq!(restored.read("/gen/a.ts").unwrap(), "export const a = 1;");
    assert_eq!(restored.group_of("/rt/index.js"), Some(VfsGroup::Runtime));
    assert_eq!(
        restored.resolve_id("phasekit:manifest").unwrap().as_str(),
        "/.phasekit/manifest.json"
    );
    assert!(!restored.exists("/gen/old.ts"));
    assert_eq!(restored.snapshot(), snapshot);
}

#[test]
fn test_snapshot_json_shape() {
    let vfs = VfsBuilder::new()
        .add_file("/gen/a.ts", "a")
        .build()
        .unwrap();

    let value = serde_json::to_value(vfs.snapshot()).unwrap();
    assert_eq!(value["files"]["/gen/a.ts"], "a");
    assert_eq!(value["groups"]["/gen/a.ts"], "virtual");
    assert!(value["ids"].as_object().unwrap().is_empty());
}

#[test]
fn test_snapshot_without_groups_field_parses() {
    let snapshot: VfsSnapshot =
        serde_json::from_str(r#"{"files": {"/gen/a.ts": "a", "/gen/b.ts": null}}"#).unwrap();

    let mut vfs = Vfs::new();
    vfs.restore(&snapshot).unwrap();
    assert_eq!(vfs.file_count(), 1);
    assert!(!vfs.exists("/gen/b.ts"));
}
