//! Lifecycle engine for phasekit.
//!
//! The engine runs a fixed set of phases (`new`, `clean`, `prepare`, `lint`,
//! `build`, `docs`, `finalize`) over a project. The phases themselves do
//! very little: each one fires a sequence of named hooks, and plugins do the
//! actual work in their hook handlers.
//!
//! # Architecture
//!
//! - [`PluginResolver`] turns [`PluginDeclaration`]s into a deduplicated,
//!   dependency-ordered list of plugins with merged options
//! - [`HookDispatcher`] runs the handlers registered for a hook name
//!   sequentially and stops at the first failure
//! - [`Engine`] owns the [`BuildSession`], decides when generated artifacts
//!   are stale, and persists the virtual filesystem after `prepare`
//!
//! # Examples
//!
//! ```no_run
//! use phasekit_core::ProjectConfig;
//! use phasekit_engine::Engine;
//! use std::path::Path;
//!
//! # async fn example() -> phasekit_engine::Result<()> {
//! let config = ProjectConfig::discover(Path::new("/projects/web"))?;
//! let mut engine = Engine::builder(config).build().await?;
//!
//! engine.build().await?;
//! engine.finalize().await?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

mod engine;
mod error;
mod hooks;
mod phase;
mod session;

pub mod plugin;

pub use engine::{Engine, EngineBuilder};
pub use error::{Error, ResolutionFailure, Result};
pub use hooks::{FnHandler, HandlerError, HookDispatcher, HookError, HookHandler, PluginHooks};
pub use phase::{EngineState, Phase};
pub use plugin::{
    CommandInstaller, InstallOptions, InstallOutcome, LoadError, OptionsStore, PackageInstaller,
    Plugin, PluginDeclaration, PluginLoader, PluginOptions, PluginProps, PluginResolver,
    RegistryLoader, ResolverSettings, merge_options, package_name,
};
pub use session::BuildSession;
