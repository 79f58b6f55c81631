//! Virtual filesystem for generated build artifacts.
//!
//! Plugins write generated files into a [`Vfs`] instead of the project tree.
//! Entries are grouped by origin, removals are remembered as tombstones, and
//! the whole store can be captured as a [`VfsSnapshot`] and restored later so
//! unchanged projects skip regeneration.
//!
//! # Examples
//!
//! ```
//! use phasekit_vfs::{Vfs, VfsGroup};
//!
//! let mut vfs = Vfs::new();
//! vfs.write_virtual("/gen/routes.ts", "export const routes = [];").unwrap();
//! vfs.write_builtin("phasekit:env", "/.phasekit/env.ts", "export {};").unwrap();
//!
//! let snapshot = vfs.snapshot();
//! let mut restored = Vfs::new();
//! restored.restore(&snapshot).unwrap();
//!
//! assert_eq!(restored.read("/gen/routes.ts").unwrap(), "export const routes = [];");
//! assert_eq!(restored.group_of("/.phasekit/env.ts"), Some(VfsGroup::Builtin));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

pub mod builder;
pub mod types;
pub mod vfs;

pub use builder::VfsBuilder;
pub use types::{Result, VfsError, VfsFile, VfsGroup, VfsPath};
pub use vfs::{Vfs, VfsSnapshot};
