//! Scaffolds a project and runs the `new` phase.

use super::Target;
use super::phase::{self, report_error};
use crate::builtin;
use anyhow::{Context, Result};
use colored::Colorize;
use phasekit_core::ProjectType;
use phasekit_core::cli::{ExitCode, OutputFormat};
use phasekit_engine::Phase;
use serde::Serialize;
use std::path::Path;

const DEFAULT_NAME: &str = "app";

#[derive(Debug, Serialize)]
struct Scaffold<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    project_type: ProjectType,
    plugins: [&'a str; 2],
}

/// Writes `phasekit.toml` into the target root unless it exists, then runs
/// the `new` phase.
///
/// # Errors
///
/// Returns an error if the root or the configuration file cannot be
/// written.
pub async fn run(
    target: &Target,
    name: Option<String>,
    project_type: ProjectType,
    format: OutputFormat,
) -> Result<ExitCode> {
    let root = target.root();
    tokio::fs::create_dir_all(root)
        .await
        .with_context(|| format!("Failed to create {}", root.display()))?;

    let path = target.config_path();
    if tokio::fs::try_exists(&path).await.unwrap_or(false) {
        tracing::info!(path = %path.display(), "Configuration exists, keeping it");
    } else {
        let name = name.unwrap_or_else(|| default_name(root));
        if name.trim().is_empty() {
            report_error(&"project name must not be empty");
            return Ok(ExitCode::CONFIG_ERROR);
        }

        let content = render_config(&name, project_type)?;
        tokio::fs::write(&path, content)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;

        if format == OutputFormat::Pretty {
            println!("{} Created {}", "✓".green().bold(), path.display());
        }
    }

    phase::run(target, Phase::New, format).await
}

fn render_config(name: &str, project_type: ProjectType) -> Result<String> {
    let scaffold = Scaffold {
        name,
        project_type,
        plugins: [builtin::MANIFEST, builtin::EMIT],
    };
    toml::to_string_pretty(&scaffold).context("Failed to render configuration")
}

fn default_name(root: &Path) -> String {
    root.canonicalize()
        .ok()
        .and_then(|path| path.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| DEFAULT_NAME.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use phasekit_core::ProjectConfig;
    use tempfile::TempDir;

    #[test]
    fn test_rendered_config_loads() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("phasekit.toml");
        std::fs::write(&path, render_config("web", ProjectType::Library).unwrap()).unwrap();

        let config = ProjectConfig::load(&path).unwrap();
        assert_eq!(config.name, "web");
        assert_eq!(config.project_type, ProjectType::Library);
        assert_eq!(config.plugins.len(), 2);
        assert_eq!(config.plugins[0], builtin::MANIFEST);
    }

    #[test]
    fn test_default_name_from_directory() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("my-site");
        std::fs::create_dir(&root).unwrap();
        assert_eq!(default_name(&root), "my-site");
        assert_eq!(default_name(&dir.path().join("missing")), DEFAULT_NAME);
    }
}
