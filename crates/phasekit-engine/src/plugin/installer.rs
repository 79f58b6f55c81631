//! Package installation for plugins that are not present yet.

use async_trait::async_trait;
use phasekit_core::InstallerConfig;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// Where and how to install a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallOptions {
    /// Directory the installer runs in
    pub cwd: PathBuf,
    /// Install as a development dependency
    pub dev: bool,
}

/// Result of an installer run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallOutcome {
    /// Process exit code; `-1` if the process was killed by a signal
    pub exit_code: i32,
    /// Captured stderr, trimmed
    pub stderr: String,
}

impl InstallOutcome {
    /// Returns `true` if the installer exited with code zero.
    #[must_use]
    pub const fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Installs plugin packages on demand.
#[async_trait]
pub trait PackageInstaller: Send + Sync {
    /// Returns `true` if `package` is installed below `search_path`.
    async fn is_installed(&self, package: &str, search_path: &Path) -> bool;

    /// Installs `package`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error only if the installer could not be started. A
    /// failed install is reported through [`InstallOutcome::exit_code`].
    async fn install(&self, package: &str, options: &InstallOptions) -> io::Result<InstallOutcome>;
}

/// [`PackageInstaller`] that runs the configured package-manager command.
///
/// With the default configuration this runs
/// `npm install <package> --save-dev` and looks for installed packages in
/// `node_modules`.
#[derive(Debug, Clone, Default)]
pub struct CommandInstaller {
    config: InstallerConfig,
}

impl CommandInstaller {
    /// Creates an installer from configuration.
    #[must_use]
    pub const fn new(config: InstallerConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &InstallerConfig {
        &self.config
    }
}

#[async_trait]
impl PackageInstaller for CommandInstaller {
    async fn is_installed(&self, package: &str, search_path: &Path) -> bool {
        let dir = search_path.join(&self.config.packages_dir).join(package);
        tokio::fs::metadata(&dir)
            .await
            .is_ok_and(|meta| meta.is_dir())
    }

    async fn install(&self, package: &str, options: &InstallOptions) -> io::Result<InstallOutcome> {
        let mut cmd = Command::new(&self.config.command);
        cmd.args(&self.config.args)
            .arg(package)
            .current_dir(&options.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if options.dev && !self.config.dev_flag.is_empty() {
            cmd.arg(&self.config.dev_flag);
        }

        tracing::debug!(
            package,
            command = %self.config.command,
            cwd = %options.cwd.display(),
            "Running package installer"
        );
        let output = cmd.output().await?;

        Ok(InstallOutcome {
            exit_code: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

/// Returns the package a specifier lives in.
///
/// Scoped specifiers keep two segments, others keep one.
///
/// # Examples
///
/// ```
/// use phasekit_engine::package_name;
///
/// assert_eq!(package_name("@acme/router/plugin"), "@acme/router");
/// assert_eq!(package_name("router/plugin"), "router");
/// assert_eq!(package_name("router"), "router");
/// ```
#[must_use]
pub fn package_name(specifier: &str) -> &str {
    let segments = if specifier.starts_with('@') { 2 } else { 1 };
    specifier
        .match_indices('/')
        .nth(segments - 1)
        .map_or(specifier, |(idx, _)| &specifier[..idx])
}
