//! phasekit command-line entry point.

use anyhow::Result;
use clap::Parser;
use phasekit_cli::cli::Cli;
use phasekit_cli::runner::{execute_command, init_logging};
use phasekit_core::cli::OutputFormat;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose)?;

    let output_format = cli
        .format
        .parse::<OutputFormat>()
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    let exit_code = execute_command(cli, output_format).await?;
    tracing::debug!(status = %exit_code, "Command finished");

    std::process::exit(exit_code.as_i32());
}
