//! Turning specifiers into plugin instances.

use crate::plugin::{Plugin, PluginProps};
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Why a loader could not produce a plugin.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// Nothing is registered under the specifier.
    #[error("no module registered as '{specifier}'")]
    NotFound {
        /// Specifier looked up
        specifier: String,
    },

    /// A module exists but could not be turned into a plugin.
    #[error("module '{specifier}' is invalid: {reason}")]
    InvalidExport {
        /// Specifier looked up
        specifier: String,
        /// Loader-provided detail
        reason: String,
    },
}

impl LoadError {
    /// Returns `true` if nothing was found under the specifier.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Source of plugin instances.
///
/// The resolver asks for `"<specifier>/plugin"` first and falls back to the
/// bare specifier, so a loader only needs to answer the names it knows.
#[async_trait]
pub trait PluginLoader: Send + Sync {
    /// Instantiates the plugin registered under `specifier`.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::NotFound` if the specifier is unknown and
    /// `LoadError::InvalidExport` if construction fails.
    async fn load(&self, specifier: &str, props: PluginProps) -> Result<Box<dyn Plugin>, LoadError>;

    /// Returns `true` if `specifier` ships with the loader and never needs
    /// installing.
    fn is_builtin(&self, specifier: &str) -> bool {
        let _ = specifier;
        false
    }
}

/// Constructor stored in a [`RegistryLoader`].
pub type PluginFactory =
    Arc<dyn Fn(PluginProps) -> Result<Box<dyn Plugin>, String> + Send + Sync>;

/// In-process loader backed by a table of constructors.
///
/// # Examples
///
/// ```
/// use phasekit_engine::{Plugin, PluginHooks, PluginOptions, PluginProps, RegistryLoader};
///
/// #[derive(Debug)]
/// struct Noop(PluginOptions);
///
/// impl Plugin for Noop {
///     fn name(&self) -> &str { "noop" }
///     fn options(&self) -> &PluginOptions { &self.0 }
///     fn options_mut(&mut self) -> &mut PluginOptions { &mut self.0 }
///     fn add_hooks(&self, _hooks: &mut PluginHooks) {}
/// }
///
/// let mut loader = RegistryLoader::new();
/// loader.register("noop", |props: PluginProps| Ok(Box::new(Noop(props.options)) as Box<dyn Plugin>));
/// assert!(loader.contains("noop"));
/// ```
#[derive(Default)]
pub struct RegistryLoader {
    factories: HashMap<String, PluginFactory>,
    builtins: BTreeSet<String>,
}

impl RegistryLoader {
    /// Creates an empty loader.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a constructor for `specifier`.
    pub fn register<F>(&mut self, specifier: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(PluginProps) -> Result<Box<dyn Plugin>, String> + Send + Sync + 'static,
    {
        self.factories.insert(specifier.into(), Arc::new(factory));
        self
    }

    /// Registers a constructor for a specifier that is never installed.
    pub fn register_builtin<F>(&mut self, specifier: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(PluginProps) -> Result<Box<dyn Plugin>, String> + Send + Sync + 'static,
    {
        let specifier = specifier.into();
        self.builtins.insert(specifier.clone());
        self.register(specifier, factory)
    }

    /// Returns `true` if `specifier` is registered.
    #[must_use]
    pub fn contains(&self, specifier: &str) -> bool {
        self.factories.contains_key(specifier)
    }
}

impl fmt::Debug for RegistryLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.factories.keys().collect();
        names.sort_unstable();
        f.debug_struct("RegistryLoader")
            .field("factories", &names)
            .field("builtins", &self.builtins)
            .finish()
    }
}

#[async_trait]
impl PluginLoader for RegistryLoader {
    async fn load(&self, specifier: &str, props: PluginProps) -> Result<Box<dyn Plugin>, LoadError> {
        let factory = self
            .factories
            .get(specifier)
            .ok_or_else(|| LoadError::NotFound {
                specifier: specifier.to_string(),
            })?;

        factory(props).map_err(|reason| LoadError::InvalidExport {
            specifier: specifier.to_string(),
            reason,
        })
    }

    fn is_builtin(&self, specifier: &str) -> bool {
        self.builtins.contains(specifier)
    }
}
