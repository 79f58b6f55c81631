//! Cache command implementation.
//!
//! Inspects or removes the persisted metadata record of a project.

use super::Target;
use super::phase::report_error;
use crate::formatters::format_output;
use anyhow::{Context, Result};
use chrono::Utc;
use clap::Subcommand;
use colored::Colorize;
use dialoguer::Confirm;
use phasekit_cache::{MetaStore, PersistedMeta};
use phasekit_core::cli::{ExitCode, OutputFormat};
use serde::Serialize;
use std::collections::BTreeMap;

/// Cache management subcommands.
#[derive(Subcommand, Debug)]
pub enum CacheCommand {
    /// Show the persisted metadata record
    Info,

    /// Remove the persisted metadata record
    Clear {
        /// Skip confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
}

/// Summary of the persisted metadata record.
#[derive(Debug, Serialize)]
pub struct CacheInfo {
    /// Path of the record
    pub location: String,
    /// Whether a readable record exists
    pub present: bool,
    /// Details of the record, if present
    pub record: Option<RecordInfo>,
}

/// Details of one metadata record.
#[derive(Debug, Serialize)]
pub struct RecordInfo {
    /// Build id of the last prepare
    pub build_id: String,
    /// Release id of the last prepare
    pub release_id: String,
    /// When the record was written (RFC 3339)
    pub written_at: String,
    /// Seconds since the record was written
    pub age_seconds: i64,
    /// Short checksum of the tree the record was generated from
    pub checksum: String,
    /// Number of generated files per group
    pub files: BTreeMap<String, usize>,
    /// Runtime ids in the record
    pub runtime_ids: Vec<String>,
}

impl From<&PersistedMeta> for RecordInfo {
    fn from(meta: &PersistedMeta) -> Self {
        let mut files = BTreeMap::new();
        for (path, content) in &meta.virtual_files {
            if content.is_none() {
                continue;
            }
            let group = meta
                .virtual_groups
                .get(path)
                .map_or("virtual", |group| group.as_str());
            *files.entry(group.to_string()).or_insert(0) += 1;
        }

        Self {
            build_id: meta.build_id.clone(),
            release_id: meta.release_id.clone(),
            written_at: meta.timestamp.to_rfc3339(),
            age_seconds: (Utc::now() - meta.timestamp).num_seconds(),
            checksum: meta.checksum.short(12).to_string(),
            files,
            runtime_ids: meta.runtime_id_map.keys().cloned().collect(),
        }
    }
}

/// Runs a cache subcommand for the project at `target`.
///
/// # Errors
///
/// Returns an error if the record cannot be removed, the confirmation
/// prompt fails, or the report cannot be formatted.
pub async fn run(target: &Target, action: CacheCommand, format: OutputFormat) -> Result<ExitCode> {
    let store = match open_store(target) {
        Ok(store) => store,
        Err(e) => {
            report_error(&format_args!("{e:#}"));
            return Ok(ExitCode::CONFIG_ERROR);
        }
    };

    match action {
        CacheCommand::Info => {
            let info = info(&store);
            println!("{}", format_output(&info, format)?);
        }
        CacheCommand::Clear { yes } => clear(&store, yes)?,
    }
    Ok(ExitCode::SUCCESS)
}

fn open_store(target: &Target) -> Result<MetaStore> {
    let config = target.load_config()?;
    MetaStore::for_project(&config.root, config.cache_path().as_deref())
        .context("Failed to locate the metadata directory")
}

/// Describes the record held by `store`.
#[must_use]
pub fn info(store: &MetaStore) -> CacheInfo {
    let record = store.load();
    CacheInfo {
        location: store.meta_path().display().to_string(),
        present: record.is_some(),
        record: record.as_ref().map(RecordInfo::from),
    }
}

fn clear(store: &MetaStore, yes: bool) -> Result<()> {
    if !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Remove persisted metadata at {}? The next phase will regenerate all files.",
                store.meta_path().display()
            ))
            .default(false)
            .interact()
            .context("Failed to get confirmation")?;

        if !confirmed {
            println!("{}", "Cancelled.".yellow());
            return Ok(());
        }
    }

    if store.clear()? {
        println!("{} Removed {}", "✓".green().bold(), store.meta_path().display());
    } else {
        println!("{}", "Nothing to remove.".dimmed());
    }
    Ok(())
}
