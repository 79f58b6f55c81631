//! Persisted metadata storage.
//!
//! Provides [`MetaStore`], which keeps one [`PersistedMeta`] record per
//! project in a data directory. Writes go through a temporary file and a
//! rename so a crash never leaves a half-written record behind. A record
//! that cannot be read back is deleted and reported as absent.

use crate::checksum::project_root_hash;
use crate::error::{CacheError, Result};
use crate::meta::PersistedMeta;
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the metadata record inside the data directory.
pub const META_FILE: &str = "meta.json";

/// RAII guard that removes a temporary file unless committed.
struct TempFileGuard {
    path: PathBuf,
    cleanup: bool,
}

impl TempFileGuard {
    const fn new(path: PathBuf) -> Self {
        Self {
            path,
            cleanup: true,
        }
    }

    fn commit(mut self) {
        self.cleanup = false;
    }
}

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if self.cleanup {
            if let Err(e) = fs::remove_file(&self.path) {
                tracing::warn!(
                    "Failed to remove temporary metadata file {}: {}",
                    self.path.display(),
                    e
                );
            } else {
                tracing::debug!("Removed temporary metadata file: {}", self.path.display());
            }
        }
    }
}

/// Reads and writes the persisted metadata of one project.
///
/// # Examples
///
/// ```
/// use phasekit_cache::{MetaStore, PersistedMeta, hash_bytes};
/// use phasekit_vfs::Vfs;
///
/// let dir = tempfile::tempdir().unwrap();
/// let store = MetaStore::with_directory(dir.path());
/// assert!(store.load().is_none());
///
/// let meta = PersistedMeta::capture(hash_bytes(b"tree"), "b1", "r1", "h", &Vfs::new());
/// store.save(&meta).unwrap();
/// assert_eq!(store.load(), Some(meta));
/// ```
#[derive(Debug, Clone)]
pub struct MetaStore {
    data_dir: PathBuf,
}

impl MetaStore {
    /// Creates a store that keeps its record directly in `dir`.
    ///
    /// The directory is created on the first [`save`](Self::save).
    #[must_use]
    pub fn with_directory(dir: impl AsRef<Path>) -> Self {
        Self {
            data_dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Creates the store for the project at `root`.
    ///
    /// With an override the record lives directly in that directory.
    /// Otherwise it lives in `<platform cache dir>/phasekit/<root hash>`.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::NoCacheDir` if no override is given and the
    /// platform has no cache directory.
    pub fn for_project(root: &Path, data_dir: Option<&Path>) -> Result<Self> {
        if let Some(dir) = data_dir {
            return Ok(Self::with_directory(dir));
        }

        let base = dirs::cache_dir().ok_or(CacheError::NoCacheDir)?;
        Ok(Self::with_directory(
            base.join("phasekit").join(project_root_hash(root)),
        ))
    }

    /// Returns the data directory.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Returns the path of the metadata record.
    #[must_use]
    pub fn meta_path(&self) -> PathBuf {
        self.data_dir.join(META_FILE)
    }

    /// Loads the metadata record.
    ///
    /// Returns `None` when there is no record. A record that cannot be read
    /// or parsed is deleted and also reported as `None`; corruption is never
    /// fatal.
    #[must_use]
    pub fn load(&self) -> Option<PersistedMeta> {
        let path = self.meta_path();
        if !path.exists() {
            tracing::debug!("No persisted metadata at {}", path.display());
            return None;
        }

        match Self::read_meta(&path) {
            Ok(meta) => {
                tracing::debug!(
                    "Loaded persisted metadata from {} (build {})",
                    path.display(),
                    meta.build_id
                );
                Some(meta)
            }
            Err(reason) => {
                tracing::warn!(
                    "Discarding corrupt metadata at {}: {}",
                    path.display(),
                    reason
                );
                if let Err(e) = fs::remove_file(&path) {
                    tracing::warn!("Failed to delete {}: {}", path.display(), e);
                }
                None
            }
        }
    }

    /// Writes the metadata record atomically.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be created or the
    /// record cannot be written.
    pub fn save(&self, meta: &PersistedMeta) -> Result<()> {
        fs::create_dir_all(&self.data_dir).map_err(|e| CacheError::io(&self.data_dir, e))?;

        let path = self.meta_path();
        let tmp = self
            .data_dir
            .join(format!("{META_FILE}.{}.tmp", std::process::id()));
        let json = serde_json::to_vec_pretty(meta)?;

        let guard = TempFileGuard::new(tmp.clone());
        fs::write(&tmp, json).map_err(|e| CacheError::io(&tmp, e))?;
        fs::rename(&tmp, &path).map_err(|e| CacheError::io(&path, e))?;
        guard.commit();

        tracing::debug!(
            "Saved metadata for build {} to {}",
            meta.build_id,
            path.display()
        );
        Ok(())
    }

    /// Deletes the metadata record.
    ///
    /// Returns `true` if a record existed.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing record cannot be removed.
    pub fn clear(&self) -> Result<bool> {
        let path = self.meta_path();
        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!("Removed metadata at {}", path.display());
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(CacheError::io(path, e)),
        }
    }

    fn read_meta(path: &Path) -> std::result::Result<PersistedMeta, String> {
        let content = fs::read_to_string(path).map_err(|e| format!("read failed: {e}"))?;
        serde_json::from_str(&content).map_err(|e| format!("Failed to parse JSON: {e}"))
    }
}
