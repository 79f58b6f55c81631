//! Incremental-build cache for phasekit.
//!
//! Three pieces decide whether generated artifacts can be reused:
//!
//! - [`checksum_tree`] hashes the tracked files of a project into a
//!   [`ContentHash`]
//! - [`PersistedMeta`] records the checksum of the last successful prepare
//!   together with a snapshot of the virtual filesystem
//! - [`MetaStore`] reads and writes that record in a project-scoped data
//!   directory, discarding it when it is corrupt
//!
//! # Examples
//!
//! ```no_run
//! use phasekit_cache::{MetaStore, TreeFilter, checksum_tree};
//! use std::path::Path;
//!
//! # fn example() -> phasekit_cache::Result<()> {
//! let root = Path::new("/projects/web");
//! let live = checksum_tree(root, &TreeFilter::default())?;
//!
//! let store = MetaStore::for_project(root, None)?;
//! let fresh = store.load().is_some_and(|meta| meta.matches(&live));
//! println!("cache usable: {fresh}");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

pub mod checksum;
pub mod error;
pub mod meta;
pub mod store;

pub use checksum::{
    ContentHash, DEFAULT_EXCLUDES, TreeFilter, checksum_tree, hash_bytes,
    is_valid_checksum_format, project_root_hash,
};
pub use error::{CacheError, Result};
pub use meta::PersistedMeta;
pub use store::{META_FILE, MetaStore};
