//! CLI-specific types.
//!
//! # Examples
//!
//! ```
//! use phasekit_core::cli::{ExitCode, OutputFormat};
//!
//! let format: OutputFormat = "json".parse().unwrap();
//! assert_eq!(format.as_str(), "json");
//!
//! assert!(ExitCode::SUCCESS.is_success());
//! assert_eq!(ExitCode::PHASE_FAILED.as_i32(), 3);
//! ```

use std::fmt;
use std::str::FromStr;

/// CLI output format.
///
/// All formats carry the same information with different presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputFormat {
    /// JSON output for machine parsing
    Json,
    /// Plain text output for scripts
    Text,
    /// Pretty-printed output with colors for human reading
    #[default]
    Pretty,
}

impl OutputFormat {
    /// Returns the string representation of the format.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Text => "text",
            Self::Pretty => "pretty",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" => Ok(Self::Text),
            "pretty" => Ok(Self::Pretty),
            _ => Err(crate::Error::InvalidArgument(format!(
                "invalid output format: '{s}' (expected: json, text, or pretty)"
            ))),
        }
    }
}

/// Process exit status of a `phasekit` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExitCode(i32);

impl ExitCode {
    /// The command completed (exit code 0).
    pub const SUCCESS: Self = Self(0);

    /// Failure without a more specific status (exit code 1).
    pub const ERROR: Self = Self(1);

    /// The configuration or a plugin declaration is invalid (exit code 2).
    pub const CONFIG_ERROR: Self = Self(2);

    /// A lifecycle phase failed (exit code 3).
    pub const PHASE_FAILED: Self = Self(3);

    /// Returns the status passed to the operating system.
    #[must_use]
    pub const fn as_i32(&self) -> i32 {
        self.0
    }

    /// Returns `true` for [`SUCCESS`](Self::SUCCESS).
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.0 == 0
    }

    /// Returns a short description of the status.
    #[must_use]
    pub const fn describe(&self) -> &'static str {
        match self.0 {
            0 => "success",
            2 => "configuration error",
            3 => "phase failed",
            _ => "error",
        }
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.0, self.describe())
    }
}
