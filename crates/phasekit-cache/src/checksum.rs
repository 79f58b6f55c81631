//! Blake3 checksums for project trees.
//!
//! Checksums are stored in the format `"blake3:<hex>"` for easy
//! identification and future algorithm upgrades.
//!
//! A tree checksum covers the relative path, length and contents of every
//! tracked file, visited in file-name order so the result does not depend
//! on directory iteration order. Dependency directories, VCS metadata and
//! build output are skipped through a [`TreeFilter`].

use crate::error::{CacheError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use walkdir::WalkDir;

const PREFIX: &str = "blake3:";

/// Directory names never included in a project checksum.
pub const DEFAULT_EXCLUDES: &[&str] = &[
    "node_modules",
    ".git",
    ".hg",
    ".svn",
    "target",
    ".phasekit",
];

/// A validated `blake3:<hex>` digest.
///
/// # Examples
///
/// ```
/// use phasekit_cache::{ContentHash, hash_bytes};
///
/// let hash = hash_bytes(b"hello");
/// assert!(hash.as_str().starts_with("blake3:"));
///
/// let parsed: ContentHash = hash.as_str().parse().unwrap();
/// assert_eq!(parsed, hash);
///
/// assert!("md5:abc".parse::<ContentHash>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentHash(String);

impl ContentHash {
    fn from_hash(hash: &blake3::Hash) -> Self {
        Self(format!("{PREFIX}{}", hash.to_hex()))
    }

    /// Returns the digest as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the first `len` hex characters, for log output.
    #[must_use]
    pub fn short(&self, len: usize) -> &str {
        let hex = &self.0[PREFIX.len()..];
        &hex[..len.min(hex.len())]
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ContentHash {
    type Error = CacheError;

    fn try_from(value: String) -> Result<Self> {
        if is_valid_checksum_format(&value) {
            Ok(Self(value))
        } else {
            Err(CacheError::InvalidChecksum { value })
        }
    }
}

impl FromStr for ContentHash {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self> {
        Self::try_from(s.to_string())
    }
}

impl From<ContentHash> for String {
    fn from(hash: ContentHash) -> Self {
        hash.0
    }
}

/// Validates checksum format.
///
/// Checks that a checksum string follows the expected format:
/// `blake3:` prefix followed by exactly 64 lowercase hexadecimal characters.
///
/// # Examples
///
/// ```
/// use phasekit_cache::is_valid_checksum_format;
///
/// assert!(is_valid_checksum_format(
///     "blake3:0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef"
/// ));
/// assert!(!is_valid_checksum_format("blake3:ABC"));
/// assert!(!is_valid_checksum_format("sha256:abc"));
/// ```
#[must_use]
pub fn is_valid_checksum_format(checksum: &str) -> bool {
    let Some(hex_part) = checksum.strip_prefix(PREFIX) else {
        return false;
    };

    hex_part.len() == 64
        && hex_part
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
}

/// Hashes a byte slice.
#[must_use]
pub fn hash_bytes(data: &[u8]) -> ContentHash {
    ContentHash::from_hash(&blake3::hash(data))
}

/// Returns a short, stable key for a project root path.
///
/// Used to give each project its own metadata directory.
///
/// # Examples
///
/// ```
/// use phasekit_cache::project_root_hash;
/// use std::path::Path;
///
/// let a = project_root_hash(Path::new("/projects/web"));
/// assert_eq!(a.len(), 16);
/// assert_eq!(a, project_root_hash(Path::new("/projects/web")));
/// assert_ne!(a, project_root_hash(Path::new("/projects/api")));
/// ```
#[must_use]
pub fn project_root_hash(root: &Path) -> String {
    let hash = blake3::hash(root.to_string_lossy().as_bytes());
    hash.to_hex().as_str()[..16].to_string()
}

/// Selects which entries of a project tree are hashed.
///
/// Names match any file or directory with that exact name at any depth.
/// Paths match one specific entry, given either relative to the root or
/// absolute.
///
/// # Examples
///
/// ```
/// use phasekit_cache::TreeFilter;
///
/// let filter = TreeFilter::default()
///     .exclude_name("coverage")
///     .exclude_path("build/out");
/// assert!(filter.names().any(|name| name == "node_modules"));
/// ```
#[derive(Debug, Clone)]
pub struct TreeFilter {
    names: BTreeSet<String>,
    paths: Vec<PathBuf>,
}

impl Default for TreeFilter {
    fn default() -> Self {
        Self {
            names: DEFAULT_EXCLUDES.iter().map(|name| (*name).to_string()).collect(),
            paths: Vec::new(),
        }
    }
}

impl TreeFilter {
    /// Creates a filter that excludes nothing.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            names: BTreeSet::new(),
            paths: Vec::new(),
        }
    }

    /// Excludes every entry called `name`.
    #[must_use]
    pub fn exclude_name(mut self, name: impl Into<String>) -> Self {
        self.names.insert(name.into());
        self
    }

    /// Excludes one entry by path.
    #[must_use]
    pub fn exclude_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.paths.push(path.into());
        self
    }

    /// Iterates over the excluded names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    fn is_excluded(&self, root: &Path, path: &Path) -> bool {
        if path
            .file_name()
            .is_some_and(|name| self.names.contains(name.to_string_lossy().as_ref()))
        {
            return true;
        }

        let relative = path.strip_prefix(root).unwrap_or(path);
        self.paths
            .iter()
            .any(|excluded| excluded == relative || excluded == path)
    }
}

/// Computes the checksum of every tracked file under `root`.
///
/// # Errors
///
/// Returns an error if `root` cannot be walked or a tracked file cannot be
/// read.
///
/// # Examples
///
/// ```
/// use phasekit_cache::{TreeFilter, checksum_tree};
///
/// let dir = tempfile::tempdir().unwrap();
/// std::fs::write(dir.path().join("index.ts"), "export {};").unwrap();
///
/// let first = checksum_tree(dir.path(), &TreeFilter::default()).unwrap();
/// let second = checksum_tree(dir.path(), &TreeFilter::default()).unwrap();
/// assert_eq!(first, second);
/// ```
pub fn checksum_tree(root: &Path, filter: &TreeFilter) -> Result<ContentHash> {
    let mut hasher = blake3::Hasher::new();
    let mut files = 0usize;

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !filter.is_excluded(root, entry.path()));

    for entry in walker {
        let entry = entry.map_err(|source| CacheError::Walk {
            path: root.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        // Separators are normalized so the digest is platform independent
        let key = relative.to_string_lossy().replace('\\', "/");
        let len = entry
            .metadata()
            .map_err(|source| CacheError::Walk {
                path: path.to_path_buf(),
                source,
            })?
            .len();

        hasher.update(key.as_bytes());
        hasher.update(&[0]);
        hasher.update(&len.to_le_bytes());

        let mut file = File::open(path).map_err(|e| CacheError::io(path, e))?;
        hasher
            .update_reader(&mut file)
            .map_err(|e| CacheError::io(path, e))?;
        files += 1;
    }

    let hash = ContentHash::from_hash(&hasher.finalize());
    tracing::debug!(
        root = %root.display(),
        files,
        checksum = hash.short(12),
        "Computed project checksum"
    );
    Ok(hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn project() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/index.ts"), "export const a = 1;").unwrap();
        fs::write(dir.path().join("package.json"), "{}").unwrap();
        dir
    }

    #[test]
    fn test_is_valid_checksum_format() {
        let valid = hash_bytes(b"x");
        assert!(is_valid_checksum_format(valid.as_str()));

        assert!(!is_valid_checksum_format("blake3:"));
        assert!(!is_valid_checksum_format(
            "blake3:0123456789ABCDEF0123456789abcdef0123456789abcdef0123456789abcdef"
        ));
        assert!(!is_valid_checksum_format("0123456789abcdef"));
    }

    #[test]
    fn test_content_hash_serde_rejects_bad_format() {
        let err = serde_json::from_str::<ContentHash>("\"blake3:nothex\"");
        assert!(err.is_err());

        let hash = hash_bytes(b"y");
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, format!("\"{hash}\""));
    }

    #[test]
    fn test_checksum_stable() {
        let dir = project();
        let a = checksum_tree(dir.path(), &TreeFilter::default()).unwrap();
        let b = checksum_tree(dir.path(), &TreeFilter::default()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_checksum_changes_with_tracked_content() {
        let dir = project();
        let before = checksum_tree(dir.path(), &TreeFilter::default()).unwrap();

        fs::write(dir.path().join("src/index.ts"), "export const a = 2;").unwrap();
        let after = checksum_tree(dir.path(), &TreeFilter::default()).unwrap();
        assert_ne!(before, after);
    }

    #[test]
    fn test_checksum_changes_with_rename() {
        let dir = project();
        let before = checksum_tree(dir.path(), &TreeFilter::default()).unwrap();

        fs::rename(dir.path().join("src/index.ts"), dir.path().join("src/main.ts")).unwrap();
        let after = checksum_tree(dir.path(), &TreeFilter::default()).unwrap();
        assert_ne!(before, after);
    }

    #[test]
    fn test_checksum_ignores_default_excludes() {
        let dir = project();
        let before = checksum_tree(dir.path(), &TreeFilter::default()).unwrap();

        fs::create_dir_all(dir.path().join("node_modules/pkg")).unwrap();
        fs::write(dir.path().join("node_modules/pkg/index.js"), "x").unwrap();
        fs::create_dir_all(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join(".git/HEAD"), "ref").unwrap();

        let after = checksum_tree(dir.path(), &TreeFilter::default()).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_checksum_ignores_excluded_path() {
        let dir = project();
        let filter = TreeFilter::default().exclude_path("build/out");
        let before = checksum_tree(dir.path(), &filter).unwrap();

        fs::create_dir_all(dir.path().join("build/out")).unwrap();
        fs::write(dir.path().join("build/out/index.js"), "x").unwrap();
        assert_eq!(before, checksum_tree(dir.path(), &filter).unwrap());

        // A sibling of the excluded path is still tracked
        fs::write(dir.path().join("build/notes.md"), "x").unwrap();
        assert_ne!(before, checksum_tree(dir.path(), &filter).unwrap());
    }

    #[test]
    fn test_checksum_ignores_absolute_excluded_path() {
        let dir = project();
        let cache = dir.path().join("cache");
        let filter = TreeFilter::default().exclude_path(&cache);
        let before = checksum_tree(dir.path(), &filter).unwrap();

        fs::create_dir_all(&cache).unwrap();
        fs::write(cache.join("meta.json"), "{}").unwrap();
        assert_eq!(before, checksum_tree(dir.path(), &filter).unwrap());
    }

    #[test]
    fn test_empty_filter_tracks_everything() {
        let dir = project();
        let before = checksum_tree(dir.path(), &TreeFilter::empty()).unwrap();

        fs::create_dir_all(dir.path().join("node_modules")).unwrap();
        fs::write(dir.path().join("node_modules/x.js"), "x").unwrap();
        assert_ne!(before, checksum_tree(dir.path(), &TreeFilter::empty()).unwrap());
    }

    #[test]
    fn test_checksum_missing_root() {
        let dir = TempDir::new().unwrap();
        let err = checksum_tree(&dir.path().join("missing"), &TreeFilter::default()).unwrap_err();
        assert!(err.is_io_error());
    }

    #[test]
    fn test_short() {
        let hash = hash_bytes(b"z");
        assert_eq!(hash.short(8).len(), 8);
        assert_eq!(hash.short(1000).len(), 64);
    }
}
