//! Core types, configuration, and errors for phasekit.
//!
//! This crate provides the foundational pieces shared by every other crate
//! in the phasekit workspace.
//!
//! # Architecture
//!
//! The core consists of:
//! - Error hierarchy with contextual information
//! - Project configuration loaded from `phasekit.toml`
//! - The [`Logger`] contract handed to plugins
//! - CLI exit codes and output formats

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

mod config;
mod error;
mod log;

pub mod cli;

pub use config::{
    CONFIG_FILE_NAME, ChecksumConfig, InstallerConfig, ProjectConfig, ProjectConfigBuilder,
    ProjectType,
};
pub use error::{Error, Result};
pub use log::{LogLevel, Logger};
