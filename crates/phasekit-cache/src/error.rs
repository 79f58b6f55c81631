//! Error types for cache operations.

use std::path::PathBuf;

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;

/// Errors that can occur while hashing a project or persisting metadata.
#[derive(thiserror::Error, Debug)]
pub enum CacheError {
    /// A checksum string is not `blake3:<64 lowercase hex>`.
    #[error("Invalid checksum format: {value}")]
    InvalidChecksum {
        /// The rejected value
        value: String,
    },

    /// Walking the project tree failed.
    #[error("Failed to walk {path}: {source}")]
    Walk {
        /// Directory being walked
        path: PathBuf,
        /// Underlying walkdir error
        #[source]
        source: walkdir::Error,
    },

    /// Reading or writing a file failed.
    #[error("IO error at {path}: {source}")]
    Io {
        /// File or directory involved
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Metadata could not be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A persisted VFS snapshot could not be restored.
    #[error("VFS error: {0}")]
    Vfs(#[from] phasekit_vfs::VfsError),

    /// No platform cache directory is available and none was configured.
    #[error("No cache directory available on this platform")]
    NoCacheDir,
}

impl CacheError {
    /// Creates an I/O error for `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns `true` if this is an I/O or directory walk error.
    #[must_use]
    pub const fn is_io_error(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::Walk { .. })
    }

    /// Returns `true` if this is a checksum format error.
    #[must_use]
    pub const fn is_invalid_checksum(&self) -> bool {
        matches!(self, Self::InvalidChecksum { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_io_error_display() {
        let error = CacheError::io(
            "/tmp/meta.json",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        let display = error.to_string();
        assert!(display.contains("/tmp/meta.json"));
        assert!(display.contains("denied"));
        assert!(error.is_io_error());
    }

    #[test]
    fn test_invalid_checksum_classification() {
        let error = CacheError::InvalidChecksum {
            value: "md5:abc".to_string(),
        };
        assert!(error.is_invalid_checksum());
        assert!(!error.is_io_error());
    }
}
