//! phasekit CLI library.
//!
//! Exposes the argument definitions, command handlers, builtin plugins and
//! output formatters behind the `phasekit` binary so they can be tested.
//!
//! # Examples
//!
//! ```bash
//! # Scaffold a project and build it
//! phasekit --root ./web new --name web
//! phasekit --root ./web build
//!
//! # Inspect persisted metadata as JSON
//! phasekit --root ./web --format json cache info
//! ```

#![allow(clippy::format_push_string)]
#![allow(clippy::unused_async)]
#![allow(clippy::missing_errors_doc)]

pub mod builtin;
pub mod cli;
pub mod commands;
pub mod formatters;
pub mod runner;
