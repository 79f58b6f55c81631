//! Lifecycle phases and engine states.

use std::fmt;

/// A top-level lifecycle operation.
///
/// Hooks are named `"<phase>:<stage>"`, for example `"prepare:runtime"`.
///
/// # Examples
///
/// ```
/// use phasekit_engine::Phase;
///
/// assert_eq!(Phase::Prepare.hook("runtime"), "prepare:runtime");
/// assert!(Phase::Build.is_stale_sensitive());
/// assert!(!Phase::Prepare.is_stale_sensitive());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Scaffold a new project
    New,
    /// Remove build output and persisted metadata
    Clean,
    /// Generate virtual files
    Prepare,
    /// Run linters
    Lint,
    /// Produce build output
    Build,
    /// Generate documentation
    Docs,
    /// Release resources at the end of a command
    Finalize,
}

impl Phase {
    /// Every phase in lifecycle order.
    pub const ALL: [Self; 7] = [
        Self::New,
        Self::Clean,
        Self::Prepare,
        Self::Lint,
        Self::Build,
        Self::Docs,
        Self::Finalize,
    ];

    /// Returns the lowercase phase name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Clean => "clean",
            Self::Prepare => "prepare",
            Self::Lint => "lint",
            Self::Build => "build",
            Self::Docs => "docs",
            Self::Finalize => "finalize",
        }
    }

    /// Returns the hook name for `stage` of this phase.
    #[must_use]
    pub fn hook(&self, stage: &str) -> String {
        format!("{}:{stage}", self.as_str())
    }

    /// Returns `true` if generated artifacts must be fresh before the phase
    /// runs.
    #[must_use]
    pub const fn is_stale_sensitive(&self) -> bool {
        matches!(self, Self::Lint | Self::Build | Self::Docs)
    }

    /// Returns the engine state while this phase runs.
    #[must_use]
    pub const fn state(&self) -> EngineState {
        match self {
            Self::New => EngineState::Creating,
            Self::Clean => EngineState::Cleaning,
            Self::Prepare => EngineState::Preparing,
            Self::Lint => EngineState::Linting,
            Self::Build => EngineState::Building,
            Self::Docs => EngineState::Documenting,
            Self::Finalize => EngineState::Finalizing,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of an [`Engine`](crate::Engine).
///
/// `Uninitialized → Initializing → Ready → <phase> → Ready … → Finalizing →
/// Done`, with `Error` reachable from anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineState {
    /// Nothing has happened yet
    Uninitialized,
    /// Computing the checksum and resolving plugins
    Initializing,
    /// Waiting for the next phase
    Ready,
    /// Running `new`
    Creating,
    /// Running `clean`
    Cleaning,
    /// Running `prepare`, explicitly or before a stale-sensitive phase
    Preparing,
    /// Running `lint`
    Linting,
    /// Running `build`
    Building,
    /// Running `docs`
    Documenting,
    /// Running `finalize`
    Finalizing,
    /// Finalized; no further phases may run
    Done,
    /// A phase failed; no further phases may run
    Error,
}

impl EngineState {
    /// Returns the lowercase state name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Initializing => "initializing",
            Self::Ready => "ready",
            Self::Creating => "creating",
            Self::Cleaning => "cleaning",
            Self::Preparing => "preparing",
            Self::Linting => "linting",
            Self::Building => "building",
            Self::Documenting => "documenting",
            Self::Finalizing => "finalizing",
            Self::Done => "done",
            Self::Error => "error",
        }
    }

    /// Returns `true` if no further phase can run.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Error)
    }
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hook_names() {
        assert_eq!(Phase::Build.hook("begin"), "build:begin");
        assert_eq!(Phase::Docs.hook("complete"), "docs:complete");
    }

    #[test]
    fn test_stale_sensitive_phases() {
        let sensitive: Vec<_> = Phase::ALL
            .iter()
            .filter(|phase| phase.is_stale_sensitive())
            .collect();
        assert_eq!(sensitive, vec![&Phase::Lint, &Phase::Build, &Phase::Docs]);
    }

    #[test]
    fn test_phase_states() {
        assert_eq!(Phase::Prepare.state(), EngineState::Preparing);
        assert_eq!(Phase::Finalize.state(), EngineState::Finalizing);
        assert!(EngineState::Done.is_terminal());
        assert!(!EngineState::Ready.is_terminal());
    }
}
