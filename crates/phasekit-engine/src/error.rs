//! Error types for the lifecycle engine.
//!
//! Fatal errors fall into four groups: configuration problems, plugin
//! resolution failures, installer failures, and hook handler failures.
//! When a phase fails, the engine logs the error with its full source chain
//! and returns it wrapped in [`Error::PhaseFailed`], so the message names the
//! phase and [`std::error::Error::source`] leads back to the original cause.
//!
//! # Examples
//!
//! ```
//! use phasekit_engine::{Error, Phase};
//!
//! let err = Error::PhaseFailed {
//!     phase: Phase::Build,
//!     source: Box::new(Error::Configuration {
//!         message: "bad output dir".to_string(),
//!     }),
//! };
//! assert_eq!(err.to_string(), "Phase 'build' failed: Configuration error: bad output dir");
//! assert_eq!(err.failed_phase(), Some(Phase::Build));
//! ```

use crate::hooks::HookError;
use crate::phase::{EngineState, Phase};
use phasekit_cache::CacheError;
use phasekit_vfs::VfsError;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Why a plugin specifier could not be turned into a plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionFailure {
    /// No module was found under any of the tried specifiers
    NotInstalled {
        /// Specifiers tried, in order
        tried: Vec<String>,
    },
    /// A module was found but did not produce a plugin
    InvalidExport {
        /// Loader-provided detail
        reason: String,
    },
    /// The plugin lacks a usable name or identifier
    InvalidModule {
        /// What was wrong with it
        reason: String,
    },
}

impl fmt::Display for ResolutionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotInstalled { tried } => write!(
                f,
                "module not found (tried {}); is the package installed?",
                tried.join(", ")
            ),
            Self::InvalidExport { reason } => {
                write!(f, "module was found but has an invalid export: {reason}")
            }
            Self::InvalidModule { reason } => {
                write!(f, "does not export a valid module: {reason}")
            }
        }
    }
}

/// Main error type for engine operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed plugin declaration or unusable project configuration.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem
        message: String,
    },

    /// A plugin could not be loaded.
    #[error("Plugin '{specifier}' {reason}")]
    Resolution {
        /// Specifier as declared
        specifier: String,
        /// What went wrong
        reason: ResolutionFailure,
    },

    /// The package installer exited with a non-zero code.
    #[error("Failed to install '{package}' (exit code {exit_code}): {stderr}")]
    Install {
        /// Package being installed
        package: String,
        /// Installer exit code
        exit_code: i32,
        /// Installer stderr
        stderr: String,
    },

    /// The package installer could not be started.
    #[error("Failed to run installer for '{package}': {source}")]
    InstallerUnavailable {
        /// Package being installed
        package: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A hook handler failed.
    #[error(transparent)]
    Hook(#[from] HookError),

    /// Checksum or metadata persistence failed.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// A virtual filesystem operation failed.
    #[error(transparent)]
    Vfs(#[from] VfsError),

    /// Loading or validating the project configuration failed.
    #[error(transparent)]
    Core(#[from] phasekit_core::Error),

    /// A filesystem operation on the project failed.
    #[error("IO error at {path}: {source}")]
    Io {
        /// Path involved
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A blocking background task panicked or was cancelled.
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// A phase was requested in a state that does not allow it.
    #[error("Cannot run '{phase}' while the engine is {state}")]
    InvalidState {
        /// Requested phase
        phase: Phase,
        /// Current engine state
        state: EngineState,
    },

    /// A phase failed; `source` holds the original error.
    #[error("Phase '{phase}' failed: {source}")]
    PhaseFailed {
        /// Phase that failed
        phase: Phase,
        /// Original error
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Returns `true` if this is a configuration error.
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        match self {
            Self::Configuration { .. } => true,
            Self::Core(e) => e.is_config_error(),
            _ => false,
        }
    }

    /// Returns `true` if this is a plugin resolution error.
    #[must_use]
    pub const fn is_resolution_error(&self) -> bool {
        matches!(self, Self::Resolution { .. })
    }

    /// Returns `true` if package installation failed.
    #[must_use]
    pub const fn is_install_error(&self) -> bool {
        matches!(
            self,
            Self::Install { .. } | Self::InstallerUnavailable { .. }
        )
    }

    /// Returns `true` if a hook handler failed.
    #[must_use]
    pub const fn is_hook_error(&self) -> bool {
        matches!(self, Self::Hook(_))
    }

    /// Returns the phase a [`PhaseFailed`](Self::PhaseFailed) error names.
    #[must_use]
    pub const fn failed_phase(&self) -> Option<Phase> {
        match self {
            Self::PhaseFailed { phase, .. } => Some(*phase),
            _ => None,
        }
    }

    /// Returns the innermost engine error, unwrapping phase failures.
    #[must_use]
    pub fn root_cause(&self) -> &Self {
        match self {
            Self::PhaseFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_messages_are_distinct() {
        let missing = Error::Resolution {
            specifier: "@acme/x".to_string(),
            reason: ResolutionFailure::NotInstalled {
                tried: vec!["@acme/x/plugin".to_string(), "@acme/x".to_string()],
            },
        };
        let invalid = Error::Resolution {
            specifier: "@acme/x".to_string(),
            reason: ResolutionFailure::InvalidExport {
                reason: "constructor rejected props".to_string(),
            },
        };

        assert!(missing.to_string().contains("not found"));
        assert!(missing.to_string().contains("@acme/x/plugin"));
        assert!(invalid.to_string().contains("invalid export"));
        assert!(missing.is_resolution_error());
    }

    #[test]
    fn test_invalid_module_message() {
        let err = Error::Resolution {
            specifier: "broken".to_string(),
            reason: ResolutionFailure::InvalidModule {
                reason: "empty name".to_string(),
            },
        };
        assert_eq!(
            err.to_string(),
            "Plugin 'broken' does not export a valid module: empty name"
        );
    }

    #[test]
    fn test_root_cause_unwraps_phase_failures() {
        let err = Error::PhaseFailed {
            phase: Phase::Build,
            source: Box::new(Error::PhaseFailed {
                phase: Phase::Prepare,
                source: Box::new(Error::Install {
                    package: "x".to_string(),
                    exit_code: 1,
                    stderr: String::new(),
                }),
            }),
        };
        assert!(err.root_cause().is_install_error());
        assert_eq!(err.failed_phase(), Some(Phase::Build));
    }

    #[test]
    fn test_core_config_error_is_config_error() {
        let err = Error::from(phasekit_core::Error::ConfigError {
            message: "missing workspace root".to_string(),
        });
        assert!(err.is_config_error());
    }
}
