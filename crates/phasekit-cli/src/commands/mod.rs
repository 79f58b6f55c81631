//! Command implementations for the phasekit CLI.
//!
//! Each command module loads what it needs from [`Target`], does its work,
//! prints a report in the requested output format and returns an exit code.

pub mod cache;
pub mod completions;
pub mod new;
pub mod phase;

use anyhow::{Context, Result};
use phasekit_core::{CONFIG_FILE_NAME, ProjectConfig};
use std::path::{Path, PathBuf};

/// Project selected by `--root` and `--config`.
#[derive(Debug, Clone)]
pub struct Target {
    root: PathBuf,
    config: Option<PathBuf>,
}

impl Target {
    /// Creates a target.
    #[must_use]
    pub const fn new(root: PathBuf, config: Option<PathBuf>) -> Self {
        Self { root, config }
    }

    /// Returns the root as given on the command line.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the configuration file to read.
    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| self.root.join(CONFIG_FILE_NAME))
    }

    /// Loads the project configuration.
    ///
    /// An explicit `--config` file must exist. Without one, a missing
    /// `phasekit.toml` yields defaults rooted at `--root`.
    pub fn load_config(&self) -> Result<ProjectConfig> {
        if let Some(path) = &self.config {
            return ProjectConfig::load(path)
                .with_context(|| format!("Failed to load {}", path.display()));
        }

        let root = self
            .root
            .canonicalize()
            .with_context(|| format!("Project root {} not found", self.root.display()))?;
        ProjectConfig::discover(&root)
            .with_context(|| format!("Failed to load configuration from {}", root.display()))
    }
}

/// Returns `true` if `err` was caused by invalid configuration.
pub(crate) fn is_config_error(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<phasekit_core::Error>()
            .is_some_and(phasekit_core::Error::is_config_error)
            || cause
                .downcast_ref::<phasekit_engine::Error>()
                .is_some_and(phasekit_engine::Error::is_config_error)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_without_config_file() {
        let dir = TempDir::new().unwrap();
        let target = Target::new(dir.path().to_path_buf(), None);

        let config = target.load_config().unwrap();
        assert_eq!(
            config.root,
            dir.path().canonicalize().unwrap()
        );
        assert!(!config.name.is_empty());
    }

    #[test]
    fn test_explicit_config_must_exist() {
        let dir = TempDir::new().unwrap();
        let target = Target::new(
            dir.path().to_path_buf(),
            Some(dir.path().join("missing.toml")),
        );
        assert!(target.load_config().is_err());
    }

    #[test]
    fn test_invalid_config_is_classified() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "output_dir = \"../out\"").unwrap();
        let target = Target::new(dir.path().to_path_buf(), None);

        let err = target.load_config().unwrap_err();
        assert!(is_config_error(&err));
    }
}
