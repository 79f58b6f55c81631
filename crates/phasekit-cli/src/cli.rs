//! CLI argument definitions and parsing.
//!
//! Defines the command-line interface structure using clap:
//! - `Cli` - Main CLI entry point
//! - `Commands` - Available subcommands

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use phasekit_core::ProjectType;
use std::path::PathBuf;

use crate::commands::cache::CacheCommand;

/// phasekit - plugin-driven project lifecycle runner.
///
/// Runs lifecycle phases over a project. Each phase fires hooks that the
/// configured plugins handle; generated files are cached between runs and
/// regenerated only when the project tree changes.
#[derive(Parser, Debug)]
#[command(name = "phasekit")]
#[command(version, about, long_about = None)]
#[command(author = "Phasekit Team")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Project root directory
    #[arg(long, global = true, default_value = ".", env = "PHASEKIT_ROOT")]
    pub root: PathBuf,

    /// Configuration file (default: <root>/phasekit.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (json, text, pretty)
    #[arg(long = "format", global = true, default_value = "pretty")]
    pub format: String,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scaffold a new project.
    ///
    /// Writes a `phasekit.toml` into the root (unless one exists) and runs
    /// the `new` phase.
    ///
    /// # Examples
    ///
    /// ```bash
    /// phasekit --root ./web new --name web
    /// phasekit --root ./ui new --type library
    /// ```
    New {
        /// Project name (default: root directory name)
        #[arg(long)]
        name: Option<String>,

        /// Project type
        #[arg(long = "type", value_enum, default_value = "application")]
        project_type: ProjectKind,
    },

    /// Remove build output, generated files and persisted metadata.
    Clean,

    /// Regenerate virtual files and persist them.
    Prepare,

    /// Run linters, regenerating files first if the project changed.
    Lint,

    /// Build the project, regenerating files first if the project changed.
    Build,

    /// Generate documentation, regenerating files first if the project
    /// changed.
    Docs,

    /// Inspect or clear persisted metadata.
    Cache {
        /// Cache action
        #[command(subcommand)]
        action: CacheCommand,
    },

    /// Generate shell completions.
    ///
    /// Generates completion scripts for various shells that can be
    /// sourced or saved to enable tab completion for this CLI.
    Completions {
        /// Target shell for completion generation
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Project type as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ProjectKind {
    /// Deployable application
    Application,
    /// Reusable library
    Library,
}

impl From<ProjectKind> for ProjectType {
    fn from(kind: ProjectKind) -> Self {
        match kind {
            ProjectKind::Application => Self::Application,
            ProjectKind::Library => Self::Library,
        }
    }
}
