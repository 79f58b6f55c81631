//! Scoped logger handed to plugins.
//!
//! The engine and every plugin log through [`Logger`], which forwards to
//! `tracing` with the logger's scope attached as a structured field. The
//! subscriber (installed by the binary) decides what is printed.

use std::fmt;

/// Severity of a log message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LogLevel {
    /// Very fine-grained diagnostics
    Trace,
    /// Developer diagnostics
    Debug,
    /// Normal progress messages
    Info,
    /// Something unexpected that was recovered from
    Warn,
    /// A failure
    Error,
    /// A step finished successfully
    Success,
}

impl LogLevel {
    /// Returns the lowercase level name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::Success => "success",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logger bound to a scope such as `phasekit` or `phasekit:@acme/router`.
///
/// # Examples
///
/// ```
/// use phasekit_core::{LogLevel, Logger};
///
/// let log = Logger::new("phasekit");
/// let child = log.child("@acme/router");
/// assert_eq!(child.scope(), "phasekit:@acme/router");
///
/// child.log(LogLevel::Info, "registered routes");
/// child.success("done");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Logger {
    scope: String,
}

impl Logger {
    /// Creates a logger for `scope`.
    #[must_use]
    pub fn new(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
        }
    }

    /// Returns the scope attached to every message.
    #[must_use]
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Creates a logger whose scope is nested under this one.
    #[must_use]
    pub fn child(&self, name: &str) -> Self {
        Self::new(format!("{}:{name}", self.scope))
    }

    /// Emits `message` at `level`.
    ///
    /// `Success` is emitted as an INFO event with `success = true`.
    pub fn log(&self, level: LogLevel, message: &str) {
        let scope = self.scope.as_str();
        match level {
            LogLevel::Trace => tracing::trace!(scope, "{message}"),
            LogLevel::Debug => tracing::debug!(scope, "{message}"),
            LogLevel::Info => tracing::info!(scope, "{message}"),
            LogLevel::Warn => tracing::warn!(scope, "{message}"),
            LogLevel::Error => tracing::error!(scope, "{message}"),
            LogLevel::Success => tracing::info!(scope, success = true, "{message}"),
        }
    }

    /// Shorthand for [`LogLevel::Trace`].
    pub fn trace(&self, message: &str) {
        self.log(LogLevel::Trace, message);
    }

    /// Shorthand for [`LogLevel::Debug`].
    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    /// Shorthand for [`LogLevel::Info`].
    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    /// Shorthand for [`LogLevel::Warn`].
    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message);
    }

    /// Shorthand for [`LogLevel::Error`].
    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }

    /// Shorthand for [`LogLevel::Success`].
    pub fn success(&self, message: &str) {
        self.log(LogLevel::Success, message);
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new("phasekit")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_scope() {
        let log = Logger::default().child("resolver").child("x");
        assert_eq!(log.scope(), "phasekit:resolver:x");
    }

    #[test]
    fn test_level_ordering() {
        assert!(LogLevel::Trace < LogLevel::Error);
        assert_eq!(LogLevel::Success.to_string(), "success");
    }
}
