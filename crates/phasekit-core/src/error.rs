//! Error types for phasekit core.
//!
//! # Examples
//!
//! ```
//! use phasekit_core::{Error, Result};
//!
//! fn check_name(name: &str) -> Result<()> {
//!     if name.is_empty() {
//!         return Err(Error::ConfigError {
//!             message: "project name cannot be empty".to_string(),
//!         });
//!     }
//!     Ok(())
//! }
//!
//! let err = check_name("").unwrap_err();
//! assert!(err.is_config_error());
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for core operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error.
    ///
    /// Raised when configuration is invalid, missing required fields,
    /// or contains contradictory settings.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration problem
        message: String,
    },

    /// Invalid argument error.
    ///
    /// Raised when CLI arguments or function parameters are invalid.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Validation error for a configuration field.
    #[error("Validation error in {field}: {reason}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Detailed reason for the validation failure
        reason: String,
    },

    /// Reading a configuration file failed.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File that could not be read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A configuration file is not valid TOML for the expected schema.
    #[error("Failed to parse {path}: {source}")]
    Parse {
        /// File that failed to parse
        path: PathBuf,
        /// Underlying TOML error
        #[source]
        source: toml::de::Error,
    },
}

impl Error {
    /// Returns `true` if this is a configuration error.
    ///
    /// Validation and parse failures count as configuration errors too,
    /// since all of them stem from a bad `phasekit.toml`.
    ///
    /// # Examples
    ///
    /// ```
    /// use phasekit_core::Error;
    ///
    /// let err = Error::ConfigError {
    ///     message: "missing root".to_string(),
    /// };
    /// assert!(err.is_config_error());
    /// ```
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigError { .. } | Self::ValidationError { .. } | Self::Parse { .. }
        )
    }

    /// Returns `true` if this is a validation error.
    ///
    /// # Examples
    ///
    /// ```
    /// use phasekit_core::Error;
    ///
    /// let err = Error::ValidationError {
    ///     field: "output_dir".to_string(),
    ///     reason: "must be relative".to_string(),
    /// };
    /// assert!(err.is_validation_error());
    /// ```
    #[must_use]
    pub const fn is_validation_error(&self) -> bool {
        matches!(self, Self::ValidationError { .. })
    }

    /// Returns `true` if this is an I/O error.
    #[must_use]
    pub const fn is_io_error(&self) -> bool {
        matches!(self, Self::Io { .. })
    }
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_detection() {
        let err = Error::ConfigError {
            message: "Invalid configuration".to_string(),
        };
        assert!(err.is_config_error());
        assert!(!err.is_io_error());
    }

    #[test]
    fn test_validation_error_is_config_error() {
        let err = Error::ValidationError {
            field: "output_dir".to_string(),
            reason: "escapes project root".to_string(),
        };
        assert!(err.is_validation_error());
        assert!(err.is_config_error());
    }

    #[test]
    fn test_io_error_display() {
        let err = Error::Io {
            path: PathBuf::from("/missing/phasekit.toml"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        let display = err.to_string();
        assert!(display.contains("/missing/phasekit.toml"));
        assert!(err.is_io_error());
        assert!(!err.is_config_error());
    }
}
