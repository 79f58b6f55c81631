//! Persisted build metadata.
//!
//! One [`PersistedMeta`] record is written after every successful prepare.
//! On disk it is a camelCase JSON object:
//!
//! ```json
//! {
//!   "checksum": "blake3:…",
//!   "buildId": "…",
//!   "releaseId": "…",
//!   "timestamp": "2025-01-01T00:00:00Z",
//!   "projectRootHash": "…",
//!   "runtimeIdMap": { "phasekit:manifest": "/.phasekit/manifest.json" },
//!   "virtualFiles": { "/gen/a.ts": "export {};", "/gen/removed.ts": null },
//!   "virtualGroups": { "/gen/a.ts": "virtual" }
//! }
//! ```

use crate::checksum::ContentHash;
use chrono::{DateTime, Utc};
use phasekit_vfs::{Vfs, VfsGroup, VfsSnapshot};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Record of the last successful prepare.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedMeta {
    /// Project checksum the snapshot was generated from
    pub checksum: ContentHash,
    /// Identifier of the prepare run that produced this record
    pub build_id: String,
    /// Identifier kept stable across builds of the same release
    pub release_id: String,
    /// When the record was written
    pub timestamp: DateTime<Utc>,
    /// Key of the project root the record belongs to
    pub project_root_hash: String,
    /// Runtime id to VFS path
    #[serde(default)]
    pub runtime_id_map: BTreeMap<String, String>,
    /// VFS path to content, `null` for removed files
    #[serde(default)]
    pub virtual_files: BTreeMap<String, Option<String>>,
    /// VFS path to group
    #[serde(default)]
    pub virtual_groups: BTreeMap<String, VfsGroup>,
}

impl PersistedMeta {
    /// Captures a record from the current state of `vfs`.
    ///
    /// # Examples
    ///
    /// ```
    /// use phasekit_cache::{PersistedMeta, hash_bytes};
    /// use phasekit_vfs::Vfs;
    ///
    /// let mut vfs = Vfs::new();
    /// vfs.write_virtual("/gen/a.ts", "export {};").unwrap();
    ///
    /// let meta = PersistedMeta::capture(hash_bytes(b"tree"), "b1", "r1", "0123456789abcdef", &vfs);
    /// assert!(meta.virtual_files.contains_key("/gen/a.ts"));
    /// assert!(meta.matches(&hash_bytes(b"tree")));
    /// ```
    #[must_use]
    pub fn capture(
        checksum: ContentHash,
        build_id: impl Into<String>,
        release_id: impl Into<String>,
        project_root_hash: impl Into<String>,
        vfs: &Vfs,
    ) -> Self {
        let VfsSnapshot { files, groups, ids } = vfs.snapshot();
        Self {
            checksum,
            build_id: build_id.into(),
            release_id: release_id.into(),
            timestamp: Utc::now(),
            project_root_hash: project_root_hash.into(),
            runtime_id_map: ids,
            virtual_files: files,
            virtual_groups: groups,
        }
    }

    /// Returns `true` if the record was generated from `checksum`.
    #[must_use]
    pub fn matches(&self, checksum: &ContentHash) -> bool {
        &self.checksum == checksum
    }

    /// Returns the VFS snapshot held by this record.
    #[must_use]
    pub fn snapshot(&self) -> VfsSnapshot {
        VfsSnapshot {
            files: self.virtual_files.clone(),
            groups: self.virtual_groups.clone(),
            ids: self.runtime_id_map.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::hash_bytes;

    fn sample_vfs() -> Vfs {
        let mut vfs = Vfs::new();
        vfs.write_virtual("/gen/a.ts", "a").unwrap();
        vfs.write_builtin("phasekit:b", "/.phasekit/b.json", "{}")
            .unwrap();
        vfs.remove("/gen/old.ts").unwrap();
        vfs
    }

    #[test]
    fn test_capture_copies_snapshot() {
        let meta = PersistedMeta::capture(hash_bytes(b"k"), "b", "r", "h", &sample_vfs());

        assert_eq!(meta.virtual_files["/gen/a.ts"], Some("a".to_string()));
        assert_eq!(meta.virtual_files["/gen/old.ts"], None);
        assert_eq!(meta.runtime_id_map["phasekit:b"], "/.phasekit/b.json");
        assert_eq!(meta.virtual_groups["/.phasekit/b.json"], VfsGroup::Builtin);
    }

    #[test]
    fn test_json_field_names() {
        let meta = PersistedMeta::capture(hash_bytes(b"k"), "b", "r", "h", &sample_vfs());
        let value = serde_json::to_value(&meta).unwrap();

        for key in [
            "checksum",
            "buildId",
            "releaseId",
            "timestamp",
            "projectRootHash",
            "runtimeIdMap",
            "virtualFiles",
            "virtualGroups",
        ] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert!(value["virtualFiles"]["/gen/old.ts"].is_null());
    }

    #[test]
    fn test_snapshot_restores_vfs() {
        let vfs = sample_vfs();
        let meta = PersistedMeta::capture(hash_bytes(b"k"), "b", "r", "h", &vfs);

        let mut restored = Vfs::new();
        restored.restore(&meta.snapshot()).unwrap();
        assert_eq!(restored, vfs);
    }

    #[test]
    fn test_matches() {
        let meta = PersistedMeta::capture(hash_bytes(b"k1"), "b", "r", "h", &Vfs::new());
        assert!(meta.matches(&hash_bytes(b"k1")));
        assert!(!meta.matches(&hash_bytes(b"k2")));
    }
}
