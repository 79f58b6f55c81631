//! Command execution and runtime logic.
//!
//! Contains the command dispatch and logging initialization.

use anyhow::Result;
use phasekit_core::cli::{ExitCode, OutputFormat};
use phasekit_engine::Phase;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Commands};
use crate::commands::{self, Target};

/// Initializes logging infrastructure.
///
/// `--verbose` forces debug level; otherwise `RUST_LOG` applies, falling
/// back to info. Logs go to stderr so stdout stays parseable.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()?;

    Ok(())
}

/// Executes the parsed command line.
///
/// Routes commands to their respective handlers and returns an exit code.
///
/// # Errors
///
/// Returns an error for failures that have no dedicated exit code.
pub async fn execute_command(cli: Cli, output_format: OutputFormat) -> Result<ExitCode> {
    let target = Target::new(cli.root, cli.config);

    match cli.command {
        Commands::New { name, project_type } => {
            commands::new::run(&target, name, project_type.into(), output_format).await
        }
        Commands::Clean => commands::phase::run(&target, Phase::Clean, output_format).await,
        Commands::Prepare => commands::phase::run(&target, Phase::Prepare, output_format).await,
        Commands::Lint => commands::phase::run(&target, Phase::Lint, output_format).await,
        Commands::Build => commands::phase::run(&target, Phase::Build, output_format).await,
        Commands::Docs => commands::phase::run(&target, Phase::Docs, output_format).await,
        Commands::Cache { action } => commands::cache::run(&target, action, output_format).await,
        Commands::Completions { shell } => {
            use clap::CommandFactory;
            let mut cmd = Cli::command();
            commands::completions::run(shell, &mut cmd).await
        }
    }
}
