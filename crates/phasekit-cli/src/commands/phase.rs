//! Runs one lifecycle phase through the engine.

use super::{Target, is_config_error};
use crate::builtin;
use crate::formatters::format_output;
use anyhow::Result;
use colored::Colorize;
use phasekit_core::ProjectConfig;
use phasekit_core::cli::{ExitCode, OutputFormat};
use phasekit_engine::{Engine, Phase};
use serde::Serialize;
use std::fmt;
use std::time::Instant;

/// Summary printed after a phase succeeds.
#[derive(Debug, Serialize)]
pub struct PhaseReport {
    /// Project name
    pub project: String,
    /// Phase that ran
    pub phase: String,
    /// Identifiers of the resolved plugins in hook order
    pub plugins: Vec<String>,
    /// Number of generated files held in the VFS
    pub generated_files: usize,
    /// Short project checksum
    pub checksum: String,
    /// Build id of the generated files, if any were produced
    pub build_id: Option<String>,
    /// Output directory
    pub output_dir: String,
    /// Wall time in milliseconds
    pub duration_ms: u64,
}

impl PhaseReport {
    fn from_engine(engine: &Engine, phase: Phase, started: Instant) -> Self {
        let session = engine.session();
        Self {
            project: session.config().name.clone(),
            phase: phase.to_string(),
            plugins: engine
                .plugin_identifiers()
                .into_iter()
                .map(str::to_string)
                .collect(),
            generated_files: session.vfs().file_count(),
            checksum: session.checksum().short(12).to_string(),
            build_id: session.meta().map(|meta| meta.build_id.clone()),
            output_dir: session.output_path().display().to_string(),
            duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        }
    }
}

/// Loads the project at `target` and runs `phase`, then `finalize`.
///
/// # Errors
///
/// Returns an error only if the report cannot be formatted. Configuration
/// and phase failures are printed and mapped to exit codes.
pub async fn run(target: &Target, phase: Phase, format: OutputFormat) -> Result<ExitCode> {
    let config = match target.load_config() {
        Ok(config) => config,
        Err(e) => {
            report_error(&format_args!("{e:#}"));
            return Ok(ExitCode::CONFIG_ERROR);
        }
    };
    execute(config, phase, format).await
}

/// Runs `phase` and `finalize` for an already loaded configuration.
///
/// # Errors
///
/// See [`run`].
pub async fn execute(config: ProjectConfig, phase: Phase, format: OutputFormat) -> Result<ExitCode> {
    let started = Instant::now();

    let mut engine = match Engine::builder(config)
        .loader(builtin::loader())
        .build()
        .await
    {
        Ok(engine) => engine,
        Err(e) => {
            report_error(&e);
            let code = if is_config_error(&anyhow::Error::new(e)) {
                ExitCode::CONFIG_ERROR
            } else {
                ExitCode::ERROR
            };
            return Ok(code);
        }
    };

    for step in [phase, Phase::Finalize] {
        if let Err(e) = engine.run(step).await {
            report_error(&e);
            return Ok(ExitCode::PHASE_FAILED);
        }
    }

    let report = PhaseReport::from_engine(&engine, phase, started);
    println!("{}", format_output(&report, format)?);
    Ok(ExitCode::SUCCESS)
}

pub(crate) fn report_error(err: &dyn fmt::Display) {
    eprintln!("{} {err}", "error:".red().bold());
}
