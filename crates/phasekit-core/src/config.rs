//! Project configuration.
//!
//! A project is described by a `phasekit.toml` file at its root. Every field
//! has a default, so an empty file is a valid (if not very useful) project.
//!
//! # Examples
//!
//! ```toml
//! name = "web"
//! type = "application"
//! output_dir = "dist"
//! auto_install = false
//!
//! plugins = [
//!     "@phasekit/manifest",
//!     ["@acme/router", { base = "/app" }],
//!     { plugin = "@acme/lint", props = { strict = true } },
//! ]
//!
//! [plugin_options."@acme/router"]
//! trailing_slash = false
//!
//! [checksum]
//! exclude = ["coverage"]
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Name of the configuration file looked up in the project root.
pub const CONFIG_FILE_NAME: &str = "phasekit.toml";

/// Kind of artifact a project produces.
///
/// Selects which build hook runs between `build:begin` and `build:complete`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectType {
    /// A deployable application
    #[default]
    Application,
    /// A reusable library
    Library,
}

impl ProjectType {
    /// Returns the lowercase name used in configuration and hook names.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Application => "application",
            Self::Library => "library",
        }
    }
}

/// Settings for the external package installer.
///
/// The default shells out to `npm install <package> --save-dev` and looks
/// for installed packages under `node_modules`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallerConfig {
    /// Executable to run
    pub command: String,
    /// Arguments placed before the package name
    pub args: Vec<String>,
    /// Flag appended when installing as a development dependency
    pub dev_flag: String,
    /// Directory (relative to a search root) holding installed packages
    pub packages_dir: String,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            command: "npm".to_string(),
            args: vec!["install".to_string()],
            dev_flag: "--save-dev".to_string(),
            packages_dir: "node_modules".to_string(),
        }
    }
}

/// Extra exclusions for the project checksum.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChecksumConfig {
    /// Directory or file names skipped while hashing the project tree
    pub exclude: Vec<String>,
}

/// Configuration of a single project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Project name, defaults to the root directory name
    pub name: String,

    /// Application or library
    #[serde(rename = "type")]
    pub project_type: ProjectType,

    /// Project root directory.
    ///
    /// Relative paths are resolved against the directory holding the
    /// configuration file.
    pub root: PathBuf,

    /// Root of the enclosing workspace, if the project lives in one.
    ///
    /// Plugin packages are looked up here as well as in the project root.
    pub workspace_root: Option<PathBuf>,

    /// Output directory relative to the root.
    /// Default: `dist`
    pub output_dir: PathBuf,

    /// Override for the directory holding persisted build metadata.
    /// Default: None (platform cache directory)
    pub cache_dir: Option<PathBuf>,

    /// Ignore persisted metadata and always regenerate.
    /// Default: false
    pub skip_cache: bool,

    /// Install missing plugin packages automatically.
    /// Default: true
    pub auto_install: bool,

    /// Plugin declarations in resolution order
    pub plugins: Vec<Value>,

    /// Recorded options keyed by plugin name or identifier
    pub plugin_options: BTreeMap<String, Map<String, Value>>,

    /// Package installer settings
    pub installer: InstallerConfig,

    /// Checksum settings
    pub checksum: ChecksumConfig,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            project_type: ProjectType::default(),
            root: PathBuf::from("."),
            workspace_root: None,
            output_dir: PathBuf::from("dist"),
            cache_dir: None,
            skip_cache: false,
            auto_install: true,
            plugins: Vec::new(),
            plugin_options: BTreeMap::new(),
            installer: InstallerConfig::default(),
            checksum: ChecksumConfig::default(),
        }
    }
}

impl ProjectConfig {
    /// Creates a builder for a project rooted at `root`.
    ///
    /// # Examples
    ///
    /// ```
    /// use phasekit_core::{ProjectConfig, ProjectType};
    ///
    /// let dir = tempfile::tempdir().unwrap();
    /// let config = ProjectConfig::builder(dir.path())
    ///     .name("demo")
    ///     .project_type(ProjectType::Library)
    ///     .auto_install(false)
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(config.name, "demo");
    /// assert!(!config.auto_install);
    /// ```
    #[must_use]
    pub fn builder(root: impl Into<PathBuf>) -> ProjectConfigBuilder {
        ProjectConfigBuilder::new(root)
    }

    /// Loads and validates configuration from a TOML file.
    ///
    /// Relative `root` and `workspace_root` values are resolved against the
    /// file's directory. An empty `name` falls back to the root directory
    /// name.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid TOML for
    /// this schema, or fails [`validate`](Self::validate).
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self = toml::from_str(&content).map_err(|source| Error::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let base = path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        config.root = absolutize(base, &config.root);
        config.workspace_root = config
            .workspace_root
            .as_deref()
            .map(|dir| absolutize(base, dir));
        config.fill_name();
        config.validate()?;
        Ok(config)
    }

    /// Loads `phasekit.toml` from `dir`, or returns defaults rooted at `dir`
    /// when no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file fails to load, or if the
    /// defaults fail validation.
    pub fn discover(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.is_file() {
            return Self::load(&path);
        }

        let mut config = Self {
            root: dir.to_path_buf(),
            ..Self::default()
        };
        config.fill_name();
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the name is empty
    /// - the root or workspace root is not an existing directory
    /// - `output_dir` is absolute, empty, or escapes the root
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::ValidationError {
                field: "name".to_string(),
                reason: "project name cannot be empty".to_string(),
            });
        }

        if !self.root.is_dir() {
            return Err(Error::ConfigError {
                message: format!("project root {} does not exist", self.root.display()),
            });
        }

        if let Some(workspace) = &self.workspace_root
            && !workspace.is_dir()
        {
            return Err(Error::ConfigError {
                message: format!("workspace root {} does not exist", workspace.display()),
            });
        }

        if self.output_dir.as_os_str().is_empty() || self.output_dir.is_absolute() {
            return Err(Error::ValidationError {
                field: "output_dir".to_string(),
                reason: "must be a non-empty relative path".to_string(),
            });
        }

        if self
            .output_dir
            .components()
            .any(|c| matches!(c, Component::ParentDir))
        {
            return Err(Error::ValidationError {
                field: "output_dir".to_string(),
                reason: "must not escape the project root".to_string(),
            });
        }

        Ok(())
    }

    /// Returns the workspace root, falling back to the project root.
    #[must_use]
    pub fn workspace_root(&self) -> &Path {
        self.workspace_root.as_deref().unwrap_or(&self.root)
    }

    /// Returns the absolute output directory.
    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        self.root.join(&self.output_dir)
    }

    /// Returns the metadata directory override, resolved against the root.
    #[must_use]
    pub fn cache_path(&self) -> Option<PathBuf> {
        self.cache_dir.as_ref().map(|dir| self.root.join(dir))
    }

    fn fill_name(&mut self) {
        if self.name.trim().is_empty()
            && let Some(dir_name) = self.root.file_name()
        {
            self.name = dir_name.to_string_lossy().into_owned();
        }
    }
}

fn absolutize(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else if path == Path::new(".") {
        base.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Builder for [`ProjectConfig`].
#[derive(Debug, Clone)]
pub struct ProjectConfigBuilder {
    config: ProjectConfig,
}

impl ProjectConfigBuilder {
    fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            config: ProjectConfig {
                root: root.into(),
                ..ProjectConfig::default()
            },
        }
    }

    /// Sets the project name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// Sets the project type.
    #[must_use]
    pub const fn project_type(mut self, project_type: ProjectType) -> Self {
        self.config.project_type = project_type;
        self
    }

    /// Sets the workspace root.
    #[must_use]
    pub fn workspace_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.workspace_root = Some(dir.into());
        self
    }

    /// Sets the output directory.
    #[must_use]
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    /// Sets the metadata directory override.
    #[must_use]
    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.cache_dir = Some(dir.into());
        self
    }

    /// Enables or disables cache bypass.
    #[must_use]
    pub const fn skip_cache(mut self, skip: bool) -> Self {
        self.config.skip_cache = skip;
        self
    }

    /// Enables or disables automatic installation of missing plugins.
    #[must_use]
    pub const fn auto_install(mut self, enabled: bool) -> Self {
        self.config.auto_install = enabled;
        self
    }

    /// Appends a plugin declaration.
    #[must_use]
    pub fn plugin(mut self, declaration: impl Into<Value>) -> Self {
        self.config.plugins.push(declaration.into());
        self
    }

    /// Records options for a plugin name or identifier.
    #[must_use]
    pub fn plugin_options(mut self, key: impl Into<String>, options: Map<String, Value>) -> Self {
        self.config.plugin_options.insert(key.into(), options);
        self
    }

    /// Replaces the installer settings.
    #[must_use]
    pub fn installer(mut self, installer: InstallerConfig) -> Self {
        self.config.installer = installer;
        self
    }

    /// Adds a name to skip while hashing the project tree.
    #[must_use]
    pub fn checksum_exclude(mut self, name: impl Into<String>) -> Self {
        self.config.checksum.exclude.push(name.into());
        self
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting configuration fails
    /// [`ProjectConfig::validate`].
    pub fn build(mut self) -> Result<ProjectConfig> {
        self.config.fill_name();
        self.config.validate()?;
        Ok(self.config)
    }
}
