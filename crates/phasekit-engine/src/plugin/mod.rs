//! Plugin contract and resolution.
//!
//! - [`Plugin`]: the capability set every plugin implements
//! - [`PluginDeclaration`]: how a plugin is referenced from configuration
//! - [`merge_options`] and [`OptionsStore`]: option precedence
//! - [`PluginLoader`] and [`PackageInstaller`]: injected collaborators
//! - [`PluginResolver`]: declarations in, ordered plugins out

mod declaration;
mod installer;
mod loader;
mod options;
mod resolver;
mod traits;

pub use declaration::PluginDeclaration;
pub use installer::{CommandInstaller, InstallOptions, InstallOutcome, PackageInstaller, package_name};
pub use loader::{LoadError, PluginFactory, PluginLoader, RegistryLoader};
pub use options::{OptionsStore, merge_options};
pub use resolver::{PluginResolver, ResolverSettings};
pub use traits::{Plugin, PluginOptions, PluginProps};
