//! The plugin contract.

use crate::hooks::PluginHooks;
use crate::plugin::PluginDeclaration;
use phasekit_core::Logger;
use serde_json::{Map, Value};
use std::fmt;

/// Options of a plugin: an arbitrary JSON object.
pub type PluginOptions = Map<String, Value>;

/// Argument a loader constructs a plugin from.
#[derive(Debug, Clone, Default)]
pub struct PluginProps {
    /// Options from the declaration
    pub options: PluginOptions,
    /// Logger scoped to the plugin
    pub log: Logger,
}

/// A unit of pluggable behavior.
///
/// Only [`name`](Self::name), the two option accessors and
/// [`add_hooks`](Self::add_hooks) are required. Two plugins are the same
/// when their identifiers match unless [`is_same`](Self::is_same) is
/// overridden.
///
/// # Examples
///
/// ```
/// use phasekit_engine::{Plugin, PluginHooks, PluginOptions};
///
/// #[derive(Debug, Default)]
/// struct Banner {
///     options: PluginOptions,
/// }
///
/// impl Plugin for Banner {
///     fn name(&self) -> &str {
///         "banner"
///     }
///
///     fn options(&self) -> &PluginOptions {
///         &self.options
///     }
///
///     fn options_mut(&mut self) -> &mut PluginOptions {
///         &mut self.options
///     }
///
///     fn add_hooks(&self, hooks: &mut PluginHooks) {
///         hooks.on_fn("build:begin", |session, _| {
///             session.log().info("building");
///             Ok(())
///         });
///     }
/// }
/// ```
pub trait Plugin: Send + Sync + fmt::Debug {
    /// Human-readable plugin name.
    fn name(&self) -> &str;

    /// Identity of the plugin within one run.
    ///
    /// Defaults to [`name`](Self::name). Plugins that may be instantiated
    /// several times with different roles return something more specific.
    fn identifier(&self) -> &str {
        self.name()
    }

    /// Effective options.
    fn options(&self) -> &PluginOptions;

    /// Effective options, for merging.
    fn options_mut(&mut self) -> &mut PluginOptions;

    /// Plugins this one needs, resolved before it.
    fn dependencies(&self) -> Vec<PluginDeclaration> {
        Vec::new()
    }

    /// Stages this plugin's hook handlers.
    ///
    /// Called once, after resolution has settled the plugin's options.
    fn add_hooks(&self, hooks: &mut PluginHooks);

    /// Returns `true` if `other` is a duplicate of this plugin.
    fn is_same(&self, other: &dyn Plugin) -> bool {
        self.identifier() == other.identifier()
    }

    /// Hands the plugin a scoped logger.
    ///
    /// Called for plugins supplied as ready-made instances. The default
    /// ignores it, which suits plugins that already carry a logger.
    fn inject_logger(&mut self, log: Logger) {
        let _ = log;
    }
}
