//! Plugin resolution.
//!
//! Declarations are expanded depth-first with an explicit stack. Every
//! declaration is loaded, and a loaded plugin collapses into an accepted one
//! only when [`Plugin::is_same`] says so. A plugin is accepted before its
//! dependencies are expanded, so a dependency that points back at it
//! collapses into the existing instance instead of recursing. The final order is post-order: every plugin comes after the
//! plugins it depends on.

use crate::error::{Error, ResolutionFailure, Result};
use crate::hooks::{HookDispatcher, PluginHooks};
use crate::plugin::{
    InstallOptions, LoadError, OptionsStore, PackageInstaller, Plugin, PluginDeclaration,
    PluginLoader, PluginOptions, PluginProps, merge_options, package_name,
};
use phasekit_core::{Logger, ProjectConfig};
use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Settings that steer installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverSettings {
    /// Install missing packages
    pub auto_install: bool,
    /// Project root; also where installs run
    pub project_root: PathBuf,
    /// Workspace root, searched alongside the project root
    pub workspace_root: PathBuf,
}

impl ResolverSettings {
    /// Derives settings from a project configuration.
    #[must_use]
    pub fn from_config(config: &ProjectConfig) -> Self {
        Self {
            auto_install: config.auto_install,
            project_root: config.root.clone(),
            workspace_root: config.workspace_root().to_path_buf(),
        }
    }
}

/// Turns [`PluginDeclaration`]s into an ordered, deduplicated plugin list.
///
/// # Examples
///
/// ```no_run
/// use phasekit_core::{Logger, ProjectConfig};
/// use phasekit_engine::{
///     CommandInstaller, HookDispatcher, OptionsStore, PluginDeclaration, PluginResolver,
///     RegistryLoader, ResolverSettings,
/// };
/// use std::sync::Arc;
///
/// # async fn example(config: ProjectConfig) -> phasekit_engine::Result<()> {
/// let resolver = PluginResolver::new(
///     Arc::new(RegistryLoader::new()),
///     Arc::new(CommandInstaller::new(config.installer.clone())),
///     ResolverSettings::from_config(&config),
///     Logger::new("phasekit"),
/// );
///
/// let mut options = OptionsStore::new();
/// let mut dispatcher = HookDispatcher::new();
/// let plugins = resolver
///     .resolve(vec![PluginDeclaration::named("@acme/router")], &mut options, &mut dispatcher)
///     .await?;
/// println!("{} plugins", plugins.len());
/// # Ok(())
/// # }
/// ```
pub struct PluginResolver {
    loader: Arc<dyn PluginLoader>,
    installer: Arc<dyn PackageInstaller>,
    settings: ResolverSettings,
    log: Logger,
}

/// One level of the expansion stack.
struct Frame {
    /// Plugin whose dependencies are being expanded; `None` for the top level
    owner: Option<usize>,
    pending: std::vec::IntoIter<PluginDeclaration>,
}

/// Plugins accepted so far in one `resolve` call.
#[derive(Default)]
struct Accepted {
    plugins: Vec<Box<dyn Plugin>>,
    /// Specifiers whose package presence was already checked
    installed: HashSet<String>,
}

impl PluginResolver {
    /// Creates a resolver.
    #[must_use]
    pub fn new(
        loader: Arc<dyn PluginLoader>,
        installer: Arc<dyn PackageInstaller>,
        settings: ResolverSettings,
        log: Logger,
    ) -> Self {
        Self {
            loader,
            installer,
            settings,
            log,
        }
    }

    /// Returns the resolver settings.
    #[must_use]
    pub const fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    /// Resolves `declarations` and registers the resulting plugins' hooks.
    ///
    /// Effective options of each plugin are recorded in `options` under its
    /// identifier. Hooks are added to `dispatcher` in the returned order.
    ///
    /// # Errors
    ///
    /// Returns an error if a package cannot be installed, a specifier cannot
    /// be loaded, or a loaded plugin has no usable name or identifier.
    pub async fn resolve(
        &self,
        declarations: Vec<PluginDeclaration>,
        options: &mut OptionsStore,
        dispatcher: &mut HookDispatcher,
    ) -> Result<Vec<Arc<dyn Plugin>>> {
        let ordered = match self.expand(declarations, options).await {
            Ok(ordered) => ordered,
            Err(e) => {
                self.log.error(&e.to_string());
                return Err(e);
            }
        };

        let mut resolved = Vec::with_capacity(ordered.len());
        for plugin in ordered {
            let mut hooks = PluginHooks::new();
            plugin.add_hooks(&mut hooks);
            let count = dispatcher.add_hooks(plugin.identifier(), hooks);
            tracing::debug!(
                plugin = plugin.identifier(),
                handlers = count,
                "Registered plugin"
            );
            resolved.push(Arc::from(plugin));
        }
        Ok(resolved)
    }

    async fn expand(
        &self,
        declarations: Vec<PluginDeclaration>,
        options: &mut OptionsStore,
    ) -> Result<Vec<Box<dyn Plugin>>> {
        let mut accepted = Accepted::default();
        let mut order = Vec::new();
        let mut stack = vec![Frame {
            owner: None,
            pending: declarations.into_iter(),
        }];

        loop {
            let Some(frame) = stack.last_mut() else {
                break;
            };
            let Some(declaration) = frame.pending.next() else {
                if let Some(Frame {
                    owner: Some(index), ..
                }) = stack.pop()
                {
                    order.push(index);
                }
                continue;
            };

            if let Some(index) = self.accept(declaration, &mut accepted, options).await? {
                let dependencies = accepted.plugins[index].dependencies();
                stack.push(Frame {
                    owner: Some(index),
                    pending: dependencies.into_iter(),
                });
            }
        }

        // Every accepted plugin owns exactly one frame, so `order` is a
        // permutation of the accepted indices.
        let mut slots: Vec<Option<Box<dyn Plugin>>> =
            accepted.plugins.into_iter().map(Some).collect();
        Ok(order
            .into_iter()
            .filter_map(|index| slots.get_mut(index).and_then(Option::take))
            .collect())
    }

    /// Returns the index of a newly accepted plugin, or `None` if the
    /// declaration collapsed into an existing one.
    async fn accept(
        &self,
        declaration: PluginDeclaration,
        accepted: &mut Accepted,
        options: &mut OptionsStore,
    ) -> Result<Option<usize>> {
        let (plugin, specifier) = match declaration {
            PluginDeclaration::Instance(mut plugin) => {
                let log = self.log.child(plugin.name());
                plugin.inject_logger(log);
                (plugin, None)
            }
            PluginDeclaration::Named(specifier) => {
                return self
                    .accept_specifier(&specifier, PluginOptions::new(), accepted, options)
                    .await;
            }
            PluginDeclaration::Configured { specifier, props } => {
                return self
                    .accept_specifier(&specifier, props, accepted, options)
                    .await;
            }
        };
        self.settle(plugin, specifier, accepted, options)
    }

    async fn accept_specifier(
        &self,
        specifier: &str,
        props: PluginOptions,
        accepted: &mut Accepted,
        options: &mut OptionsStore,
    ) -> Result<Option<usize>> {
        if !accepted.installed.contains(specifier) {
            self.ensure_installed(specifier).await?;
            accepted.installed.insert(specifier.to_string());
        }
        let plugin = self.load(specifier, props).await?;
        self.settle(plugin, Some(specifier), accepted, options)
    }

    /// Validates, merges options and deduplicates a freshly obtained plugin.
    fn settle(
        &self,
        mut plugin: Box<dyn Plugin>,
        specifier: Option<&str>,
        accepted: &mut Accepted,
        options: &mut OptionsStore,
    ) -> Result<Option<usize>> {
        validate(plugin.as_ref(), specifier)?;

        if let Some(index) = accepted
            .plugins
            .iter()
            .position(|existing| existing.is_same(plugin.as_ref()))
        {
            let existing = accepted.plugins[index].as_mut();
            merge_into(existing, plugin.options(), options);
            tracing::trace!(
                specifier = specifier.unwrap_or_default(),
                plugin = existing.identifier(),
                "Duplicate plugin, merged options into existing instance"
            );
            return Ok(None);
        }

        let mut layers = vec![plugin.options()];
        layers.extend(options.get(plugin.identifier()));
        if plugin.name() != plugin.identifier() {
            layers.extend(options.get(plugin.name()));
        }
        let merged = merge_options(layers);
        *plugin.options_mut() = merged;
        options.record(plugin.identifier(), plugin.options().clone());

        let index = accepted.plugins.len();
        self.log.debug(&format!("Resolved plugin {}", plugin.identifier()));
        accepted.plugins.push(plugin);
        Ok(Some(index))
    }

    async fn ensure_installed(&self, specifier: &str) -> Result<()> {
        if self.loader.is_builtin(specifier) {
            return Ok(());
        }

        let package = package_name(specifier);
        let (in_workspace, in_project) = tokio::join!(
            self.installer
                .is_installed(package, &self.settings.workspace_root),
            self.installer
                .is_installed(package, &self.settings.project_root),
        );
        if in_workspace || in_project {
            return Ok(());
        }

        if !self.settings.auto_install {
            self.log.warn(&format!(
                "Package '{package}' is not installed and auto-install is disabled"
            ));
            return Ok(());
        }

        self.log.info(&format!("Installing {package}"));
        let install = InstallOptions {
            cwd: self.settings.project_root.clone(),
            dev: true,
        };
        let outcome = self
            .installer
            .install(package, &install)
            .await
            .map_err(|source| Error::InstallerUnavailable {
                package: package.to_string(),
                source,
            })?;

        if !outcome.success() {
            return Err(Error::Install {
                package: package.to_string(),
                exit_code: outcome.exit_code,
                stderr: outcome.stderr,
            });
        }

        self.log.success(&format!("Installed {package}"));
        Ok(())
    }

    async fn load(&self, specifier: &str, props: PluginOptions) -> Result<Box<dyn Plugin>> {
        let log = self.log.child(specifier);
        let tried = [format!("{specifier}/plugin"), specifier.to_string()];

        for candidate in &tried {
            let props = PluginProps {
                options: props.clone(),
                log: log.clone(),
            };
            match self.loader.load(candidate, props).await {
                Ok(plugin) => {
                    tracing::trace!(specifier, module = %candidate, "Loaded plugin module");
                    return Ok(plugin);
                }
                Err(LoadError::NotFound { .. }) => {}
                Err(LoadError::InvalidExport { reason, .. }) => {
                    return Err(Error::Resolution {
                        specifier: specifier.to_string(),
                        reason: ResolutionFailure::InvalidExport { reason },
                    });
                }
            }
        }

        Err(Error::Resolution {
            specifier: specifier.to_string(),
            reason: ResolutionFailure::NotInstalled {
                tried: tried.to_vec(),
            },
        })
    }
}

impl fmt::Debug for PluginResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginResolver")
            .field("settings", &self.settings)
            .field("log", &self.log)
            .finish_non_exhaustive()
    }
}

fn validate(plugin: &dyn Plugin, specifier: Option<&str>) -> Result<()> {
    let reason = if plugin.name().trim().is_empty() {
        "plugin name is empty".to_string()
    } else if plugin.identifier().is_empty() {
        "plugin identifier is empty".to_string()
    } else if plugin.identifier().chars().any(char::is_whitespace) {
        format!("identifier '{}' contains whitespace", plugin.identifier())
    } else {
        return Ok(());
    };

    Err(Error::Resolution {
        specifier: specifier.unwrap_or(plugin.name()).to_string(),
        reason: ResolutionFailure::InvalidModule { reason },
    })
}

/// Fills missing options of `existing` from `incoming`; existing values win.
fn merge_into(existing: &mut dyn Plugin, incoming: &PluginOptions, options: &mut OptionsStore) {
    let merged = merge_options([existing.options(), incoming]);
    *existing.options_mut() = merged;
    options.record(existing.identifier(), existing.options().clone());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::{InstallOutcome, RegistryLoader};
    use async_trait::async_trait;
    use mockall::mock;
    use serde_json::{Value, json};
    use std::path::Path;
    use std::sync::Mutex;

    mock! {
        pub Installer {}

        #[async_trait]
        impl PackageInstaller for Installer {
            async fn is_installed(&self, package: &str, search_path: &Path) -> bool;
            async fn install(&self, package: &str, options: &InstallOptions) -> std::io::Result<InstallOutcome>;
        }
    }

    type Calls = Arc<Mutex<Vec<String>>>;

    #[derive(Debug)]
    struct TestPlugin {
        name: String,
        identifier: String,
        options: PluginOptions,
        deps: Vec<String>,
        calls: Calls,
    }

    impl Plugin for TestPlugin {
        fn name(&self) -> &str {
            &self.name
        }

        fn identifier(&self) -> &str {
            &self.identifier
        }

        fn options(&self) -> &PluginOptions {
            &self.options
        }

        fn options_mut(&mut self) -> &mut PluginOptions {
            &mut self.options
        }

        fn dependencies(&self) -> Vec<PluginDeclaration> {
            self.deps.iter().map(PluginDeclaration::named).collect()
        }

        fn add_hooks(&self, hooks: &mut PluginHooks) {
            let calls = Arc::clone(&self.calls);
            let id = self.identifier.clone();
            hooks.on_fn("prepare:entry", move |_, _| {
                calls.lock().unwrap().push(id.clone());
                Ok(())
            });
        }
    }

    struct Fixture {
        loader: RegistryLoader,
        calls: Calls,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                loader: RegistryLoader::new(),
                calls: Calls::default(),
            }
        }

        fn plugin(mut self, specifier: &str, identifier: &str, deps: &[&str]) -> Self {
            let calls = Arc::clone(&self.calls);
            let name = specifier.to_string();
            let identifier = identifier.to_string();
            let deps: Vec<String> = deps.iter().map(ToString::to_string).collect();
            self.loader.register_builtin(specifier, move |props| {
                Ok(Box::new(TestPlugin {
                    name: name.clone(),
                    identifier: identifier.clone(),
                    options: props.options,
                    deps: deps.clone(),
                    calls: Arc::clone(&calls),
                }) as Box<dyn Plugin>)
            });
            self
        }

        fn resolver(self, installer: impl PackageInstaller + 'static) -> (PluginResolver, Calls) {
            let settings = ResolverSettings {
                auto_install: true,
                project_root: PathBuf::from("/project"),
                workspace_root: PathBuf::from("/project"),
            };
            let resolver = PluginResolver::new(
                Arc::new(self.loader),
                Arc::new(installer),
                settings,
                Logger::new("test"),
            );
            (resolver, self.calls)
        }
    }

    fn props(value: Value) -> PluginOptions {
        value.as_object().cloned().unwrap_or_default()
    }

    fn ids(plugins: &[Arc<dyn Plugin>]) -> Vec<&str> {
        plugins.iter().map(|p| p.identifier()).collect()
    }

    fn unused_installer() -> MockInstaller {
        let mut installer = MockInstaller::new();
        installer.expect_is_installed().never();
        installer.expect_install().never();
        installer
    }

    #[tokio::test]
    async fn test_resolution_is_idempotent() {
        let (resolver, _) = Fixture::new()
            .plugin("a", "a", &["b"])
            .plugin("b", "b", &[])
            .plugin("c", "c", &[])
            .resolver(unused_installer());

        let declare = || vec![PluginDeclaration::named("a"), PluginDeclaration::named("c")];
        let first = resolver
            .resolve(declare(), &mut OptionsStore::new(), &mut HookDispatcher::new())
            .await
            .unwrap();
        let second = resolver
            .resolve(declare(), &mut OptionsStore::new(), &mut HookDispatcher::new())
            .await
            .unwrap();

        assert_eq!(ids(&first), vec!["b", "a", "c"]);
        assert_eq!(ids(&first), ids(&second));
    }

    #[tokio::test]
    async fn test_duplicate_declaration_keeps_first_options() {
        let (resolver, _) = Fixture::new().plugin("a", "a", &[]).resolver(unused_installer());
        let mut options = OptionsStore::new();

        let plugins = resolver
            .resolve(
                vec![
                    PluginDeclaration::configured("a", props(json!({ "x": 1 }))),
                    PluginDeclaration::configured("a", props(json!({ "x": 2, "y": 3 }))),
                ],
                &mut options,
                &mut HookDispatcher::new(),
            )
            .await
            .unwrap();

        assert_eq!(plugins.len(), 1);
        assert_eq!(Value::Object(plugins[0].options().clone()), json!({ "x": 1, "y": 3 }));
        assert_eq!(options.get("a").unwrap()["x"], json!(1));
    }

    #[tokio::test]
    async fn test_is_same_collapses_distinct_specifiers() {
        let (resolver, _) = Fixture::new()
            .plugin("router", "router", &[])
            .plugin("router-legacy", "router", &[])
            .resolver(unused_installer());
        let mut dispatcher = HookDispatcher::new();

        let plugins = resolver
            .resolve(
                vec![
                    PluginDeclaration::configured("router", props(json!({ "base": "/" }))),
                    PluginDeclaration::configured(
                        "router-legacy",
                        props(json!({ "base": "/old", "legacy": true })),
                    ),
                ],
                &mut OptionsStore::new(),
                &mut dispatcher,
            )
            .await
            .unwrap();

        assert_eq!(ids(&plugins), vec!["router"]);
        assert_eq!(plugins[0].name(), "router");
        assert_eq!(
            Value::Object(plugins[0].options().clone()),
            json!({ "base": "/", "legacy": true })
        );
        assert_eq!(dispatcher.handler_count("prepare:entry"), 1);
    }

    #[tokio::test]
    async fn test_same_specifier_with_distinct_identifiers() {
        let mut fixture = Fixture::new();
        let calls = Arc::clone(&fixture.calls);
        fixture.loader.register_builtin("router", move |props| {
            let role = props
                .options
                .get("role")
                .and_then(Value::as_str)
                .unwrap_or("default")
                .to_string();
            Ok(Box::new(TestPlugin {
                name: "router".to_string(),
                identifier: format!("router#{role}"),
                options: props.options,
                deps: Vec::new(),
                calls: Arc::clone(&calls),
            }) as Box<dyn Plugin>)
        });
        let (resolver, _) = fixture.resolver(unused_installer());
        let mut options = OptionsStore::new();
        let mut dispatcher = HookDispatcher::new();

        let plugins = resolver
            .resolve(
                vec![
                    PluginDeclaration::configured("router", props(json!({ "role": "admin" }))),
                    PluginDeclaration::configured("router", props(json!({ "role": "public" }))),
                    PluginDeclaration::configured(
                        "router",
                        props(json!({ "role": "admin", "base": "/admin" })),
                    ),
                ],
                &mut options,
                &mut dispatcher,
            )
            .await
            .unwrap();

        assert_eq!(ids(&plugins), vec!["router#admin", "router#public"]);
        assert_eq!(
            dispatcher.plugins_for("prepare:entry"),
            vec!["router#admin", "router#public"]
        );
        assert_eq!(options.get("router#admin").unwrap()["base"], json!("/admin"));
        assert_eq!(options.get("router#public").unwrap()["role"], json!("public"));
    }

    #[tokio::test]
    async fn test_dependency_hooks_run_first() {
        let (resolver, calls) = Fixture::new()
            .plugin("b", "b", &["c"])
            .plugin("c", "c", &[])
            .resolver(unused_installer());
        let mut dispatcher = HookDispatcher::new();

        let plugins = resolver
            .resolve(vec![PluginDeclaration::named("b")], &mut OptionsStore::new(), &mut dispatcher)
            .await
            .unwrap();
        assert_eq!(ids(&plugins), vec!["c", "b"]);

        let dir = tempfile::TempDir::new().unwrap();
        let config = ProjectConfig::builder(dir.path()).name("t").build().unwrap();
        let mut session = crate::BuildSession::new(config, phasekit_cache::hash_bytes(b"k"));
        dispatcher
            .call_hook("prepare:entry", &mut session, &[])
            .await
            .unwrap();

        assert_eq!(*calls.lock().unwrap(), vec!["c", "b"]);
    }

    #[tokio::test]
    async fn test_dependency_cycle_terminates() {
        let (resolver, _) = Fixture::new()
            .plugin("a", "a", &["b"])
            .plugin("b", "b", &["a"])
            .resolver(unused_installer());
        let mut dispatcher = HookDispatcher::new();

        let plugins = resolver
            .resolve(vec![PluginDeclaration::named("a")], &mut OptionsStore::new(), &mut dispatcher)
            .await
            .unwrap();

        assert_eq!(ids(&plugins), vec!["b", "a"]);
        assert_eq!(dispatcher.plugins_for("prepare:entry"), vec!["b", "a"]);
    }

    #[tokio::test]
    async fn test_recorded_options_precedence() {
        let (resolver, _) = Fixture::new()
            .plugin("router", "router#admin", &[])
            .resolver(unused_installer());
        let mut options = OptionsStore::new();
        options.record("router", props(json!({ "base": "/", "from_name": true, "x": 0 })));
        options.record("router#admin", props(json!({ "base": "/admin", "x": 0 })));

        let plugins = resolver
            .resolve(
                vec![PluginDeclaration::configured("router", props(json!({ "x": 1 })))],
                &mut options,
                &mut HookDispatcher::new(),
            )
            .await
            .unwrap();

        assert_eq!(
            Value::Object(plugins[0].options().clone()),
            json!({ "x": 1, "base": "/admin", "from_name": true })
        );
        assert_eq!(options.get("router#admin").unwrap()["x"], json!(1));
    }

    #[tokio::test]
    async fn test_instance_declaration_is_used_as_is() {
        let (resolver, _) = Fixture::new().plugin("a", "a", &[]).resolver(unused_installer());
        let instance = TestPlugin {
            name: "a".to_string(),
            identifier: "a".to_string(),
            options: props(json!({ "inline": true })),
            deps: Vec::new(),
            calls: Calls::default(),
        };

        let plugins = resolver
            .resolve(
                vec![PluginDeclaration::instance(instance), PluginDeclaration::named("a")],
                &mut OptionsStore::new(),
                &mut HookDispatcher::new(),
            )
            .await
            .unwrap();

        assert_eq!(plugins.len(), 1);
        assert_eq!(plugins[0].options()["inline"], json!(true));
    }

    #[tokio::test]
    async fn test_not_installed_and_invalid_export_differ() {
        let mut fixture = Fixture::new();
        fixture
            .loader
            .register_builtin("broken", |_| Err("no default export".to_string()));
        let (resolver, _) = fixture.resolver(unused_installer());

        let invalid = resolver
            .resolve(
                vec![PluginDeclaration::named("broken")],
                &mut OptionsStore::new(),
                &mut HookDispatcher::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            invalid,
            Error::Resolution { reason: ResolutionFailure::InvalidExport { .. }, .. }
        ));

        let mut installed = MockInstaller::new();
        installed.expect_is_installed().returning(|_, _| true);
        let (resolver, _) = Fixture::new().resolver(installed);
        let missing = resolver
            .resolve(
                vec![PluginDeclaration::named("@acme/nowhere")],
                &mut OptionsStore::new(),
                &mut HookDispatcher::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            missing,
            Error::Resolution { reason: ResolutionFailure::NotInstalled { .. }, .. }
        ));
        assert!(missing.to_string().contains("@acme/nowhere/plugin"));
    }

    #[tokio::test]
    async fn test_invalid_identifier_rejected() {
        let (resolver, _) = Fixture::new()
            .plugin("spaced", "has space", &[])
            .resolver(unused_installer());

        let err = resolver
            .resolve(
                vec![PluginDeclaration::named("spaced")],
                &mut OptionsStore::new(),
                &mut HookDispatcher::new(),
            )
            .await
            .unwrap_err();
        assert!(err.to_string().contains("does not export a valid module"));
    }

    #[tokio::test]
    async fn test_missing_package_is_installed() {
        let mut fixture = Fixture::new();
        fixture.loader.register("@acme/router", |props| {
            Ok(Box::new(TestPlugin {
                name: "@acme/router".to_string(),
                identifier: "@acme/router".to_string(),
                options: props.options,
                deps: Vec::new(),
                calls: Calls::default(),
            }) as Box<dyn Plugin>)
        });

        let mut installer = MockInstaller::new();
        installer
            .expect_is_installed()
            .times(2)
            .returning(|_, _| false);
        installer
            .expect_install()
            .withf(|package: &str, options: &InstallOptions| {
                package == "@acme/router" && options.dev && options.cwd == Path::new("/project")
            })
            .times(1)
            .returning(|_, _| {
                Ok(InstallOutcome {
                    exit_code: 0,
                    stderr: String::new(),
                })
            });
        let (resolver, _) = fixture.resolver(installer);

        let plugins = resolver
            .resolve(
                vec![PluginDeclaration::named("@acme/router")],
                &mut OptionsStore::new(),
                &mut HookDispatcher::new(),
            )
            .await
            .unwrap();
        assert_eq!(ids(&plugins), vec!["@acme/router"]);
    }

    #[tokio::test]
    async fn test_installer_failure_is_fatal() {
        let mut installer = MockInstaller::new();
        installer.expect_is_installed().returning(|_, _| false);
        installer.expect_install().times(1).returning(|_, _| {
            Ok(InstallOutcome {
                exit_code: 1,
                stderr: "E404".to_string(),
            })
        });
        let (resolver, _) = Fixture::new().resolver(installer);

        let err = resolver
            .resolve(
                vec![PluginDeclaration::named("@acme/router/plugin")],
                &mut OptionsStore::new(),
                &mut HookDispatcher::new(),
            )
            .await
            .unwrap_err();

        assert!(err.is_install_error());
        assert!(matches!(
            err,
            Error::Install { ref package, exit_code: 1, ref stderr } if package == "@acme/router" && stderr == "E404"
        ));
    }

    #[tokio::test]
    async fn test_auto_install_disabled_skips_installer() {
        let mut installer = MockInstaller::new();
        installer.expect_is_installed().returning(|_, _| false);
        installer.expect_install().never();
        let loader = RegistryLoader::new();
        let resolver = PluginResolver::new(
            Arc::new(loader),
            Arc::new(installer),
            ResolverSettings {
                auto_install: false,
                project_root: PathBuf::from("/project"),
                workspace_root: PathBuf::from("/workspace"),
            },
            Logger::new("test"),
        );

        let err = resolver
            .resolve(
                vec![PluginDeclaration::named("x")],
                &mut OptionsStore::new(),
                &mut HookDispatcher::new(),
            )
            .await
            .unwrap_err();
        assert!(err.is_resolution_error());
    }
}
