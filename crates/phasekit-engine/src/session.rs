//! Per-command build state shared with hook handlers.

use crate::plugin::{OptionsStore, PluginOptions};
use phasekit_cache::{ContentHash, PersistedMeta};
use phasekit_core::{Logger, ProjectConfig};
use phasekit_vfs::Vfs;
use std::path::{Path, PathBuf};

/// State of one command.
///
/// The engine owns exactly one session and lends it mutably to each hook
/// handler in turn, so handlers never run against the same session
/// concurrently.
///
/// # Examples
///
/// ```
/// use phasekit_cache::hash_bytes;
/// use phasekit_core::ProjectConfig;
/// use phasekit_engine::BuildSession;
///
/// let dir = tempfile::tempdir().unwrap();
/// let config = ProjectConfig::builder(dir.path()).name("demo").build().unwrap();
/// let mut session = BuildSession::new(config, hash_bytes(b"tree"));
///
/// session.vfs_mut().write_virtual("/gen/a.ts", "export {};").unwrap();
/// assert!(!session.is_cache_valid());
/// ```
#[derive(Debug)]
pub struct BuildSession {
    config: ProjectConfig,
    vfs: Vfs,
    options: OptionsStore,
    checksum: ContentHash,
    meta: Option<PersistedMeta>,
    build_id: String,
    release_id: String,
    log: Logger,
}

impl BuildSession {
    /// Creates a session for `config` whose tree currently hashes to
    /// `checksum`.
    ///
    /// Options recorded in the configuration seed the options store.
    #[must_use]
    pub fn new(config: ProjectConfig, checksum: ContentHash) -> Self {
        let options = OptionsStore::from_config(&config.plugin_options);
        let log = Logger::new("phasekit").child(&config.name);
        Self {
            config,
            vfs: Vfs::new(),
            options,
            checksum,
            meta: None,
            build_id: new_id(),
            release_id: new_id(),
            log,
        }
    }

    /// Returns the project configuration.
    #[must_use]
    pub const fn config(&self) -> &ProjectConfig {
        &self.config
    }

    /// Returns the project root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.config.root
    }

    /// Returns the absolute output directory.
    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        self.config.output_path()
    }

    /// Returns the virtual filesystem.
    #[must_use]
    pub const fn vfs(&self) -> &Vfs {
        &self.vfs
    }

    /// Returns the virtual filesystem for writing.
    pub const fn vfs_mut(&mut self) -> &mut Vfs {
        &mut self.vfs
    }

    /// Returns the effective options recorded for a plugin name or
    /// identifier.
    #[must_use]
    pub fn plugin_options(&self, key: &str) -> Option<&PluginOptions> {
        self.options.get(key)
    }

    /// Returns the options store.
    #[must_use]
    pub const fn options(&self) -> &OptionsStore {
        &self.options
    }

    pub(crate) const fn options_mut(&mut self) -> &mut OptionsStore {
        &mut self.options
    }

    /// Returns the live project checksum.
    #[must_use]
    pub const fn checksum(&self) -> &ContentHash {
        &self.checksum
    }

    /// Returns the persisted metadata loaded for this project, if any.
    #[must_use]
    pub const fn meta(&self) -> Option<&PersistedMeta> {
        self.meta.as_ref()
    }

    /// Returns the identifier of the current build.
    #[must_use]
    pub fn build_id(&self) -> &str {
        &self.build_id
    }

    /// Returns the release identifier.
    ///
    /// Carried over from persisted metadata when there is any, so repeated
    /// builds of an unchanged release share it.
    #[must_use]
    pub fn release_id(&self) -> &str {
        &self.release_id
    }

    /// Returns the session logger.
    #[must_use]
    pub const fn log(&self) -> &Logger {
        &self.log
    }

    /// Returns `true` if persisted artifacts were generated from the live
    /// checksum and caching is enabled.
    #[must_use]
    pub fn is_cache_valid(&self) -> bool {
        !self.config.skip_cache
            && self
                .meta
                .as_ref()
                .is_some_and(|meta| meta.matches(&self.checksum))
    }

    pub(crate) fn set_checksum(&mut self, checksum: ContentHash) {
        self.checksum = checksum;
    }

    pub(crate) fn set_meta(&mut self, meta: Option<PersistedMeta>) {
        if let Some(meta) = &meta {
            self.release_id.clone_from(&meta.release_id);
        }
        self.meta = meta;
    }

    pub(crate) fn start_build(&mut self) {
        self.build_id = new_id();
    }
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
