//! Virtual filesystem implementation.
//!
//! Entries live in a `BTreeMap` keyed by [`VfsPath`], so every listing is
//! sorted. Removing a file leaves a tombstone behind; tombstones are
//! invisible to reads but survive [`Vfs::snapshot`] so a restored store
//! remembers what was deliberately deleted.
//!
//! # Examples
//!
//! ```
//! use phasekit_vfs::Vfs;
//!
//! let mut vfs = Vfs::new();
//! vfs.write_virtual("/gen/a.ts", "export const a = 1;").unwrap();
//! vfs.remove("/gen/a.ts").unwrap();
//!
//! assert!(!vfs.exists("/gen/a.ts"));
//! assert_eq!(vfs.snapshot().files.get("/gen/a.ts"), Some(&None));
//! ```

use crate::types::{Result, VfsError, VfsFile, VfsGroup, VfsPath};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    file: Option<VfsFile>,
    group: VfsGroup,
}

/// Serializable capture of a [`Vfs`].
///
/// `files` maps every path to its content, or `None` for a tombstone.
/// `groups` records each path's group and `ids` maps runtime ids to paths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VfsSnapshot {
    /// Path to content (`None` marks a removed file)
    pub files: BTreeMap<String, Option<String>>,
    /// Path to group
    #[serde(default)]
    pub groups: BTreeMap<String, VfsGroup>,
    /// Runtime id to path
    #[serde(default)]
    pub ids: BTreeMap<String, String>,
}

impl VfsSnapshot {
    /// Returns `true` if the snapshot holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// An in-memory store of generated files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vfs {
    entries: BTreeMap<VfsPath, Entry>,
    ids: BTreeMap<String, VfsPath>,
}

impl Vfs {
    /// Creates an empty virtual filesystem.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes `content` to `path` in `group`, replacing any existing entry
    /// or tombstone.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is invalid.
    pub fn write(
        &mut self,
        path: impl AsRef<Path>,
        content: impl Into<String>,
        group: VfsGroup,
    ) -> Result<()> {
        let path = VfsPath::new(path)?;
        self.entries.insert(
            path,
            Entry {
                file: Some(VfsFile::new(content)),
                group,
            },
        );
        Ok(())
    }

    /// Writes a generated source file.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is invalid.
    pub fn write_virtual(&mut self, path: impl AsRef<Path>, content: impl Into<String>) -> Result<()> {
        self.write(path, content, VfsGroup::Virtual)
    }

    /// Writes a runtime support file.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is invalid.
    pub fn write_runtime(&mut self, path: impl AsRef<Path>, content: impl Into<String>) -> Result<()> {
        self.write(path, content, VfsGroup::Runtime)
    }

    /// Writes a builtin file and registers it under a runtime `id`.
    ///
    /// Re-registering an id points it at the new path.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is invalid.
    ///
    /// # Examples
    ///
    /// ```
    /// use phasekit_vfs::Vfs;
    ///
    /// let mut vfs = Vfs::new();
    /// vfs.write_builtin("phasekit:manifest", "/.phasekit/manifest.json", "{}").unwrap();
    ///
    /// let path = vfs.resolve_id("phasekit:manifest").unwrap();
    /// assert_eq!(path.as_str(), "/.phasekit/manifest.json");
    /// ```
    pub fn write_builtin(
        &mut self,
        id: impl Into<String>,
        path: impl AsRef<Path>,
        content: impl Into<String>,
    ) -> Result<()> {
        let path = VfsPath::new(path)?;
        self.entries.insert(
            path.clone(),
            Entry {
                file: Some(VfsFile::new(content)),
                group: VfsGroup::Builtin,
            },
        );
        self.ids.insert(id.into(), path);
        Ok(())
    }

    /// Reads the content of a live file.
    ///
    /// # Errors
    ///
    /// Returns `VfsError::FileNotFound` if the path was never written or has
    /// been removed, or an error if the path is invalid.
    pub fn read(&self, path: impl AsRef<Path>) -> Result<&str> {
        let path = VfsPath::new(path)?;
        self.entries
            .get(&path)
            .and_then(|entry| entry.file.as_ref())
            .map(VfsFile::content)
            .ok_or_else(|| VfsError::FileNotFound {
                path: path.as_str().to_string(),
            })
    }

    /// Returns `true` if a live file exists at `path`.
    ///
    /// Invalid paths and tombstones return `false`.
    #[must_use]
    pub fn exists(&self, path: impl AsRef<Path>) -> bool {
        VfsPath::new(path)
            .ok()
            .and_then(|p| self.entries.get(&p))
            .is_some_and(|entry| entry.file.is_some())
    }

    /// Removes a file, leaving a tombstone in its place.
    ///
    /// Returns `true` if a live file was removed. Removing a path that was
    /// never written still records a tombstone.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is invalid.
    pub fn remove(&mut self, path: impl AsRef<Path>) -> Result<bool> {
        let path = VfsPath::new(path)?;
        let entry = self.entries.entry(path).or_insert(Entry {
            file: None,
            group: VfsGroup::Virtual,
        });
        Ok(entry.file.take().is_some())
    }

    /// Lists the direct children of a directory.
    ///
    /// Subdirectories appear once, as their own path. Tombstones are skipped.
    ///
    /// # Errors
    ///
    /// Returns `VfsError::NotADirectory` if `path` is a live file, or an
    /// error if the path is invalid.
    pub fn list_dir(&self, path: impl AsRef<Path>) -> Result<Vec<VfsPath>> {
        let dir = VfsPath::new(path)?;

        if self.exists(&dir) {
            return Err(VfsError::NotADirectory {
                path: dir.as_str().to_string(),
            });
        }

        let prefix = if dir.as_str().ends_with('/') {
            dir.as_str().to_string()
        } else {
            format!("{}/", dir.as_str())
        };

        let mut children: Vec<VfsPath> = Vec::new();
        for file_path in self.live_paths() {
            let Some(relative) = file_path.as_str().strip_prefix(&prefix) else {
                continue;
            };
            if relative.is_empty() {
                continue;
            }

            let child = match relative.find('/') {
                None => file_path.clone(),
                Some(idx) => VfsPath::new(format!("{prefix}{}", &relative[..idx]))?,
            };
            children.push(child);
        }

        children.sort();
        children.dedup();
        Ok(children)
    }

    /// Returns the number of live files.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.live_paths().count()
    }

    /// Returns `true` if there are no entries, live or removed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns all live paths in sorted order.
    #[must_use]
    pub fn all_paths(&self) -> Vec<&VfsPath> {
        self.live_paths().collect()
    }

    /// Returns the live paths belonging to `group`, in sorted order.
    #[must_use]
    pub fn group_paths(&self, group: VfsGroup) -> Vec<&VfsPath> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.group == group && entry.file.is_some())
            .map(|(path, _)| path)
            .collect()
    }

    /// Returns the group of a live file.
    #[must_use]
    pub fn group_of(&self, path: impl AsRef<Path>) -> Option<VfsGroup> {
        VfsPath::new(path)
            .ok()
            .and_then(|p| self.entries.get(&p))
            .filter(|entry| entry.file.is_some())
            .map(|entry| entry.group)
    }

    /// Iterates over live files with their groups, in path order.
    pub fn files(&self) -> impl Iterator<Item = (&VfsPath, &VfsFile, VfsGroup)> {
        self.entries
            .iter()
            .filter_map(|(path, entry)| entry.file.as_ref().map(|file| (path, file, entry.group)))
    }

    /// Resolves a runtime id to the path it was registered with.
    #[must_use]
    pub fn resolve_id(&self, id: &str) -> Option<&VfsPath> {
        self.ids.get(id)
    }

    /// Returns the runtime id index.
    #[must_use]
    pub const fn runtime_ids(&self) -> &BTreeMap<String, VfsPath> {
        &self.ids
    }

    /// Removes every entry, tombstone, and runtime id.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.ids.clear();
    }

    /// Captures the full store, tombstones included.
    #[must_use]
    pub fn snapshot(&self) -> VfsSnapshot {
        let mut snapshot = VfsSnapshot::default();
        for (path, entry) in &self.entries {
            let key = path.as_str().to_string();
            snapshot.files.insert(
                key.clone(),
                entry.file.as_ref().map(|file| file.content().to_string()),
            );
            snapshot.groups.insert(key, entry.group);
        }
        for (id, path) in &self.ids {
            snapshot.ids.insert(id.clone(), path.as_str().to_string());
        }
        snapshot
    }

    /// Replaces the contents of this store with `snapshot`.
    ///
    /// Paths missing from `groups` default to [`VfsGroup::Virtual`]. The
    /// store is left untouched if any path is invalid.
    ///
    /// # Errors
    ///
    /// Returns an error if any path in the snapshot is invalid.
    pub fn restore(&mut self, snapshot: &VfsSnapshot) -> Result<()> {
        let mut entries = BTreeMap::new();
        for (path, content) in &snapshot.files {
            let group = snapshot.groups.get(path).copied().unwrap_or_default();
            entries.insert(
                VfsPath::new(path)?,
                Entry {
                    file: content.as_ref().map(VfsFile::new),
                    group,
                },
            );
        }

        let mut ids = BTreeMap::new();
        for (id, path) in &snapshot.ids {
            ids.insert(id.clone(), VfsPath::new(path)?);
        }

        self.entries = entries;
        self.ids = ids;
        Ok(())
    }

    fn live_paths(&self) -> impl Iterator<Item = &VfsPath> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.file.is_some())
            .map(|(path, _)| path)
    }
}
