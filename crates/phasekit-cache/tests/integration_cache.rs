//! Integration tests for the checksum / metadata cycle.

use phasekit_cache::{MetaStore, PersistedMeta, TreeFilter, checksum_tree, project_root_hash};
use phasekit_vfs::Vfs;
use std::fs;
use tempfile::TempDir;

fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("src")).unwrap();
    fs::write(dir.path().join("src/index.ts"), "export const a = 1;").unwrap();
    dir
}

#[test]
fn test_record_matches_until_tracked_file_changes() {
    let project = project();
    let data = TempDir::new().unwrap();
    let store = MetaStore::for_project(project.path(), Some(data.path())).unwrap();
    let filter = TreeFilter::default().exclude_path("dist");

    let mut vfs = Vfs::new();
    vfs.write_virtual("/gen/a.ts", "export {};").unwrap();

    let k1 = checksum_tree(project.path(), &filter).unwrap();
    store
        .save(&PersistedMeta::capture(
            k1.clone(),
            "b1",
            "r1",
            project_root_hash(project.path()),
            &vfs,
        ))
        .unwrap();

    // Output written by a build does not invalidate the record
    fs::create_dir_all(project.path().join("dist")).unwrap();
    fs::write(project.path().join("dist/index.js"), "x").unwrap();
    let k_same = checksum_tree(project.path(), &filter).unwrap();
    assert!(store.load().unwrap().matches(&k_same));

    fs::write(project.path().join("src/index.ts"), "export const a = 2;").unwrap();
    let k2 = checksum_tree(project.path(), &filter).unwrap();
    assert_ne!(k1, k2);
    assert!(!store.load().unwrap().matches(&k2));
}

#[test]
fn test_data_dir_inside_project_is_not_tracked() {
    let project = project();
    let data_dir = project.path().join(".cache/phasekit");
    let store = MetaStore::for_project(project.path(), Some(data_dir.as_path())).unwrap();
    let filter = TreeFilter::default().exclude_path(&data_dir);

    let before = checksum_tree(project.path(), &filter).unwrap();
    store
        .save(&PersistedMeta::capture(
            before.clone(),
            "b1",
            "r1",
            "h",
            &Vfs::new(),
        ))
        .unwrap();

    let after = checksum_tree(project.path(), &filter).unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_restore_from_loaded_record() {
    let data = TempDir::new().unwrap();
    let store = MetaStore::with_directory(data.path());

    let mut vfs = Vfs::new();
    vfs.write_builtin("phasekit:manifest", "/.phasekit/manifest.json", "{}")
        .unwrap();
    vfs.write_runtime("/rt/index.js", "export {};").unwrap();

    let checksum = phasekit_cache::hash_bytes(b"tree");
    store
        .save(&PersistedMeta::capture(checksum, "b1", "r1", "h", &vfs))
        .unwrap();

    let mut restored = Vfs::new();
    restored.restore(&store.load().unwrap().snapshot()).unwrap();
    assert_eq!(restored, vfs);
}
