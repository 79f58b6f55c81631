//! Core types for the virtual filesystem.
//!
//! # Examples
//!
//! ```
//! use phasekit_vfs::{VfsFile, VfsGroup, VfsPath};
//!
//! let path = VfsPath::new("/gen/routes.ts").unwrap();
//! let file = VfsFile::new("export {};");
//!
//! assert_eq!(path.as_str(), "/gen/routes.ts");
//! assert_eq!(file.content(), "export {};");
//! assert_eq!(VfsGroup::Builtin.as_str(), "builtin");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during VFS operations.
///
/// # Examples
///
/// ```
/// use phasekit_vfs::VfsError;
///
/// let error = VfsError::FileNotFound {
///     path: "/missing.ts".to_string(),
/// };
///
/// assert!(error.is_not_found());
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VfsError {
    /// File not found, or removed during this session
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found
        path: String,
    },

    /// Path exists but is not a directory
    #[error("Not a directory: {path}")]
    NotADirectory {
        /// The path that is not a directory
        path: String,
    },

    /// Path is empty or not valid UTF-8
    #[error("Invalid path: {path}")]
    InvalidPath {
        /// The invalid path
        path: String,
    },

    /// Path is not absolute (must start with '/')
    #[error("Path must be absolute: {path}")]
    PathNotAbsolute {
        /// The relative path
        path: String,
    },

    /// Path contains a '..' component
    #[error("Path contains invalid components: {path}")]
    InvalidPathComponent {
        /// The path with invalid components
        path: String,
    },

    /// A group name did not match any known group
    #[error("Unknown VFS group: {group}")]
    UnknownGroup {
        /// The unrecognized group name
        group: String,
    },
}

impl VfsError {
    /// Returns `true` if this is a file not found error.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::FileNotFound { .. })
    }

    /// Returns `true` if this is a not-a-directory error.
    #[must_use]
    pub const fn is_not_directory(&self) -> bool {
        matches!(self, Self::NotADirectory { .. })
    }

    /// Returns `true` if this is an invalid path error.
    ///
    /// # Examples
    ///
    /// ```
    /// use phasekit_vfs::VfsPath;
    ///
    /// let err = VfsPath::new("relative/file.ts").unwrap_err();
    /// assert!(err.is_invalid_path());
    /// ```
    #[must_use]
    pub const fn is_invalid_path(&self) -> bool {
        matches!(
            self,
            Self::InvalidPath { .. }
                | Self::PathNotAbsolute { .. }
                | Self::InvalidPathComponent { .. }
        )
    }
}

/// Result type for VFS operations.
pub type Result<T> = std::result::Result<T, VfsError>;

/// A validated virtual filesystem path.
///
/// Paths use Unix conventions on every platform: they start with '/',
/// use forward slashes, and never contain a `..` component.
///
/// # Examples
///
/// ```
/// use phasekit_vfs::VfsPath;
///
/// assert!(VfsPath::new("/gen/a.ts").is_ok());
/// assert!(VfsPath::new("/gen/a..b.ts").is_ok());
///
/// assert!(VfsPath::new("gen/a.ts").is_err());
/// assert!(VfsPath::new("/gen/../escape.ts").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VfsPath(String);

impl VfsPath {
    /// Creates a new `VfsPath`.
    ///
    /// # Errors
    ///
    /// Returns `VfsError::InvalidPath` if the path is empty or not UTF-8.
    /// Returns `VfsError::PathNotAbsolute` if the path does not start with '/'.
    /// Returns `VfsError::InvalidPathComponent` if any component is `..`.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let path_str = path.to_str().ok_or_else(|| VfsError::InvalidPath {
            path: path.display().to_string(),
        })?;

        let normalized = if cfg!(target_os = "windows") {
            path_str.replace(std::path::MAIN_SEPARATOR, "/")
        } else {
            path_str.to_string()
        };

        if normalized.is_empty() {
            return Err(VfsError::InvalidPath {
                path: String::new(),
            });
        }

        if !normalized.starts_with('/') {
            return Err(VfsError::PathNotAbsolute { path: normalized });
        }

        if normalized.split('/').any(|segment| segment == "..") {
            return Err(VfsError::InvalidPathComponent { path: normalized });
        }

        Ok(Self(normalized))
    }

    /// Returns the path as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the path as a `Path` reference.
    #[must_use]
    pub fn as_path(&self) -> &Path {
        Path::new(&self.0)
    }

    /// Returns the path without its leading '/'.
    ///
    /// Used to place a VFS entry under a directory on disk.
    ///
    /// # Examples
    ///
    /// ```
    /// use phasekit_vfs::VfsPath;
    ///
    /// let path = VfsPath::new("/gen/a.ts").unwrap();
    /// assert_eq!(path.relative(), "gen/a.ts");
    /// ```
    #[must_use]
    pub fn relative(&self) -> &str {
        self.0.trim_start_matches('/')
    }

    /// Returns the parent directory of this path.
    ///
    /// Returns `None` for the root path.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.0 == "/" {
            return None;
        }
        self.0.rfind('/').map(|pos| {
            if pos == 0 {
                Self("/".to_string())
            } else {
                Self(self.0[..pos].to_string())
            }
        })
    }
}

impl fmt::Display for VfsPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<Path> for VfsPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.0)
    }
}

/// A file in the virtual filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VfsFile {
    content: String,
}

impl VfsFile {
    /// Creates a new VFS file with the given content.
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    /// Returns the file content as a string slice.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns the size of the file content in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.content.len()
    }
}

/// Origin of a VFS entry.
///
/// - `Builtin`: files addressable by a stable runtime id (see
///   [`Vfs::write_builtin`](crate::Vfs::write_builtin))
/// - `Runtime`: support code emitted alongside the build output
/// - `Virtual`: generated sources only visible to the build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VfsGroup {
    /// Files registered under a runtime id
    Builtin,
    /// Runtime support files
    Runtime,
    /// Generated sources
    #[default]
    Virtual,
}

impl VfsGroup {
    /// Returns the lowercase group name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Builtin => "builtin",
            Self::Runtime => "runtime",
            Self::Virtual => "virtual",
        }
    }
}

impl fmt::Display for VfsGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VfsGroup {
    type Err = VfsError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "builtin" => Ok(Self::Builtin),
            "runtime" => Ok(Self::Runtime),
            "virtual" => Ok(Self::Virtual),
            _ => Err(VfsError::UnknownGroup {
                group: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vfs_path_valid() {
        let path = VfsPath::new("/gen/routes/index.ts").unwrap();
        assert_eq!(path.as_str(), "/gen/routes/index.ts");
        assert_eq!(path.to_string(), "/gen/routes/index.ts");
    }

    #[test]
    fn test_vfs_path_rejects_relative() {
        let err = VfsPath::new("gen/a.ts").unwrap_err();
        assert!(matches!(err, VfsError::PathNotAbsolute { .. }));
    }

    #[test]
    fn test_vfs_path_rejects_parent_component() {
        let err = VfsPath::new("/gen/../../etc/passwd").unwrap_err();
        assert!(matches!(err, VfsError::InvalidPathComponent { .. }));
    }

    #[test]
    fn test_vfs_path_allows_double_dot_in_names() {
        assert!(VfsPath::new("/gen/a..b.ts").is_ok());
    }

    #[test]
    fn test_vfs_path_rejects_empty() {
        let err = VfsPath::new("").unwrap_err();
        assert!(err.is_invalid_path());
    }

    #[test]
    fn test_parent() {
        let path = VfsPath::new("/gen/routes/index.ts").unwrap();
        assert_eq!(path.parent().unwrap().as_str(), "/gen/routes");
        assert_eq!(VfsPath::new("/a.ts").unwrap().parent().unwrap().as_str(), "/");
        assert!(VfsPath::new("/").unwrap().parent().is_none());
    }

    #[test]
    fn test_relative() {
        assert_eq!(VfsPath::new("/gen/a.ts").unwrap().relative(), "gen/a.ts");
    }

    #[test]
    fn test_file_size() {
        let file = VfsFile::new("hello");
        assert_eq!(file.size(), 5);
        assert_eq!(file.content(), "hello");
    }

    #[test]
    fn test_group_from_str() {
        assert_eq!("runtime".parse::<VfsGroup>().unwrap(), VfsGroup::Runtime);
        assert!("other".parse::<VfsGroup>().is_err());
    }

    #[test]
    fn test_group_serde_lowercase() {
        let json = serde_json::to_string(&VfsGroup::Builtin).unwrap();
        assert_eq!(json, "\"builtin\"");
    }
}
