//! Builder pattern for constructing virtual filesystems.
//!
//! # Examples
//!
//! ```
//! use phasekit_vfs::VfsBuilder;
//!
//! let vfs = VfsBuilder::new()
//!     .add_file("/gen/routes.ts", "export const routes = [];")
//!     .add_runtime("/rt/index.js", "export {};")
//!     .add_builtin("phasekit:manifest", "/.phasekit/manifest.json", "{}")
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(vfs.file_count(), 3);
//! ```

use crate::types::{Result, VfsError, VfsGroup};
use crate::vfs::Vfs;
use std::path::Path;

/// Builder for constructing a virtual filesystem.
///
/// Path errors are collected and the first one is returned from
/// [`build`](Self::build), so calls can be chained without `?`.
#[derive(Debug, Default)]
pub struct VfsBuilder {
    vfs: Vfs,
    errors: Vec<VfsError>,
}

impl VfsBuilder {
    /// Creates a new empty VFS builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a generated source file.
    #[must_use]
    pub fn add_file(self, path: impl AsRef<Path>, content: impl Into<String>) -> Self {
        self.add(path, content, VfsGroup::Virtual)
    }

    /// Adds a runtime support file.
    #[must_use]
    pub fn add_runtime(self, path: impl AsRef<Path>, content: impl Into<String>) -> Self {
        self.add(path, content, VfsGroup::Runtime)
    }

    /// Adds a builtin file registered under `id`.
    #[must_use]
    pub fn add_builtin(
        mut self,
        id: impl Into<String>,
        path: impl AsRef<Path>,
        content: impl Into<String>,
    ) -> Self {
        if let Err(e) = self.vfs.write_builtin(id, path, content) {
            self.errors.push(e);
        }
        self
    }

    /// Adds many generated source files at once.
    ///
    /// # Examples
    ///
    /// ```
    /// use phasekit_vfs::VfsBuilder;
    ///
    /// let vfs = VfsBuilder::new()
    ///     .add_files([("/a.ts", "a"), ("/b.ts", "b")])
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(vfs.file_count(), 2);
    /// ```
    #[must_use]
    pub fn add_files<P, C>(mut self, files: impl IntoIterator<Item = (P, C)>) -> Self
    where
        P: AsRef<Path>,
        C: Into<String>,
    {
        for (path, content) in files {
            if let Err(e) = self.vfs.write_virtual(path, content) {
                self.errors.push(e);
            }
        }
        self
    }

    /// Consumes the builder and returns the constructed VFS.
    ///
    /// # Errors
    ///
    /// Returns the first error encountered while adding files, if any.
    pub fn build(self) -> Result<Vfs> {
        match self.errors.into_iter().next() {
            Some(error) => Err(error),
            None => Ok(self.vfs),
        }
    }

    fn add(mut self, path: impl AsRef<Path>, content: impl Into<String>, group: VfsGroup) -> Self {
        if let Err(e) = self.vfs.write(path, content, group) {
            self.errors.push(e);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_collects_first_error() {
        let result = VfsBuilder::new()
            .add_file("/ok.ts", "")
            .add_file("relative.ts", "")
            .add_file("/../escape.ts", "")
            .build();

        let err = result.unwrap_err();
        assert!(matches!(err, VfsError::PathNotAbsolute { .. }));
    }

    #[test]
    fn test_builder_groups() {
        let vfs = VfsBuilder::new()
            .add_file("/gen/a.ts", "")
            .add_runtime("/rt/b.js", "")
            .add_builtin("phasekit:c", "/.phasekit/c.json", "{}")
            .build()
            .unwrap();

        assert_eq!(vfs.group_of("/gen/a.ts"), Some(VfsGroup::Virtual));
        assert_eq!(vfs.group_of("/rt/b.js"), Some(VfsGroup::Runtime));
        assert_eq!(vfs.group_of("/.phasekit/c.json"), Some(VfsGroup::Builtin));
        assert!(vfs.resolve_id("phasekit:c").is_some());
    }
}
