//! Top-level orchestration of lifecycle phases.

use crate::error::{Error, Result};
use crate::hooks::HookDispatcher;
use crate::phase::{EngineState, Phase};
use crate::plugin::{
    CommandInstaller, PackageInstaller, Plugin, PluginDeclaration, PluginLoader, PluginResolver,
    RegistryLoader, ResolverSettings,
};
use crate::session::BuildSession;
use phasekit_cache::{ContentHash, MetaStore, PersistedMeta, TreeFilter, checksum_tree, project_root_hash};
use phasekit_core::ProjectConfig;
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

const PREPARE_STAGES: [&str; 4] = ["begin", "entry", "runtime", "complete"];

/// Configures and initializes an [`Engine`].
///
/// Without an explicit loader no specifier can be loaded, so only plugin
/// instances passed to [`plugin`](Self::plugin) take part. Without an
/// explicit installer the configured package-manager command is used.
pub struct EngineBuilder {
    config: ProjectConfig,
    loader: Option<Arc<dyn PluginLoader>>,
    installer: Option<Arc<dyn PackageInstaller>>,
    instances: Vec<Box<dyn Plugin>>,
    store: Option<MetaStore>,
}

impl EngineBuilder {
    fn new(config: ProjectConfig) -> Self {
        Self {
            config,
            loader: None,
            installer: None,
            instances: Vec::new(),
            store: None,
        }
    }

    /// Sets the loader that turns specifiers into plugins.
    #[must_use]
    pub fn loader(mut self, loader: impl PluginLoader + 'static) -> Self {
        self.loader = Some(Arc::new(loader));
        self
    }

    /// Sets the package installer.
    #[must_use]
    pub fn installer(mut self, installer: impl PackageInstaller + 'static) -> Self {
        self.installer = Some(Arc::new(installer));
        self
    }

    /// Adds a ready-made plugin after the configured declarations.
    #[must_use]
    pub fn plugin(mut self, plugin: impl Plugin + 'static) -> Self {
        self.instances.push(Box::new(plugin));
        self
    }

    /// Overrides where persisted metadata lives.
    #[must_use]
    pub fn store(mut self, store: MetaStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Computes the project checksum, restores generated files if they are
    /// still fresh, and resolves plugins.
    ///
    /// # Errors
    ///
    /// Returns an error if the project tree cannot be hashed, a plugin
    /// declaration is malformed, or plugin resolution fails.
    pub async fn build(self) -> Result<Engine> {
        tracing::debug!(
            project = %self.config.name,
            state = %EngineState::Initializing,
            "Initializing engine"
        );
        let name = self.config.name.clone();
        match self.initialize().await {
            Ok(engine) => {
                tracing::info!(
                    project = %name,
                    plugins = engine.plugins.len(),
                    "Engine ready"
                );
                Ok(engine)
            }
            Err(e) => {
                tracing::error!(project = %name, "Engine initialization failed: {e}");
                Err(e)
            }
        }
    }

    async fn initialize(self) -> Result<Engine> {
        let store = match self.store {
            Some(store) => store,
            None => {
                MetaStore::for_project(&self.config.root, self.config.cache_path().as_deref())?
            }
        };
        let filter = checksum_filter(&self.config, &store);
        let checksum = hash_tree(self.config.root.clone(), filter.clone()).await?;

        let meta = if self.config.skip_cache {
            tracing::debug!("Caching disabled, ignoring persisted metadata");
            None
        } else {
            store.load()
        };

        let mut session = BuildSession::new(self.config, checksum);
        session.set_meta(meta);
        restore_vfs(&mut session);

        let mut declarations = session
            .config()
            .plugins
            .iter()
            .map(PluginDeclaration::from_value)
            .collect::<Result<Vec<_>>>()?;
        declarations.extend(self.instances.into_iter().map(PluginDeclaration::Instance));

        let loader = self
            .loader
            .unwrap_or_else(|| Arc::new(RegistryLoader::new()));
        let installer = self.installer.unwrap_or_else(|| {
            Arc::new(CommandInstaller::new(session.config().installer.clone()))
        });
        let resolver = PluginResolver::new(
            loader,
            installer,
            ResolverSettings::from_config(session.config()),
            session.log().clone(),
        );

        let mut dispatcher = HookDispatcher::new();
        let plugins = resolver
            .resolve(declarations, session.options_mut(), &mut dispatcher)
            .await?;

        Ok(Engine {
            session,
            dispatcher,
            plugins,
            store,
            filter,
            state: EngineState::Ready,
        })
    }
}

impl fmt::Debug for EngineBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineBuilder")
            .field("config", &self.config)
            .field("instances", &self.instances)
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

/// Runs lifecycle phases over one project.
///
/// Each phase fires its hooks in a fixed order. `lint`, `build` and `docs`
/// first make sure generated files match the project tree and run
/// `prepare` when they do not. A failed phase moves the engine to
/// [`EngineState::Error`]; after that, and after `finalize`, every phase is
/// rejected.
///
/// # Examples
///
/// ```no_run
/// use phasekit_core::ProjectConfig;
/// use phasekit_engine::{Engine, EngineState};
/// use std::path::Path;
///
/// # async fn example() -> phasekit_engine::Result<()> {
/// let config = ProjectConfig::discover(Path::new("."))?;
/// let mut engine = Engine::builder(config).build().await?;
///
/// engine.prepare().await?;
/// engine.lint().await?;
/// engine.finalize().await?;
/// assert_eq!(engine.state(), EngineState::Done);
/// # Ok(())
/// # }
/// ```
pub struct Engine {
    session: BuildSession,
    dispatcher: HookDispatcher,
    plugins: Vec<Arc<dyn Plugin>>,
    store: MetaStore,
    filter: TreeFilter,
    state: EngineState,
}

impl Engine {
    /// Starts configuring an engine for `config`.
    #[must_use]
    pub fn builder(config: ProjectConfig) -> EngineBuilder {
        EngineBuilder::new(config)
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> EngineState {
        self.state
    }

    /// Returns the build session.
    #[must_use]
    pub const fn session(&self) -> &BuildSession {
        &self.session
    }

    /// Returns the build session for writing.
    pub const fn session_mut(&mut self) -> &mut BuildSession {
        &mut self.session
    }

    /// Returns the resolved plugins in hook order.
    #[must_use]
    pub fn plugins(&self) -> &[Arc<dyn Plugin>] {
        &self.plugins
    }

    /// Returns the identifiers of the resolved plugins in hook order.
    #[must_use]
    pub fn plugin_identifiers(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.identifier()).collect()
    }

    /// Returns the hook dispatcher.
    #[must_use]
    pub const fn dispatcher(&self) -> &HookDispatcher {
        &self.dispatcher
    }

    /// Returns the metadata store.
    #[must_use]
    pub const fn store(&self) -> &MetaStore {
        &self.store
    }

    /// Calls an arbitrary hook outside of any phase.
    ///
    /// # Errors
    ///
    /// Returns the first handler failure.
    pub async fn call_hook(&mut self, hook: &str, args: &[Value]) -> Result<usize> {
        Ok(self
            .dispatcher
            .call_hook(hook, &mut self.session, args)
            .await?)
    }

    /// Scaffolds a new project.
    ///
    /// # Errors
    ///
    /// See [`run`](Self::run).
    pub async fn new_project(&mut self) -> Result<()> {
        self.run(Phase::New).await
    }

    /// Removes build output, generated files and persisted metadata.
    ///
    /// # Errors
    ///
    /// See [`run`](Self::run).
    pub async fn clean(&mut self) -> Result<()> {
        self.run(Phase::Clean).await
    }

    /// Regenerates virtual files and persists them.
    ///
    /// Always runs, whether or not persisted files are fresh.
    ///
    /// # Errors
    ///
    /// See [`run`](Self::run).
    pub async fn prepare(&mut self) -> Result<()> {
        self.run(Phase::Prepare).await
    }

    /// Runs linters.
    ///
    /// # Errors
    ///
    /// See [`run`](Self::run).
    pub async fn lint(&mut self) -> Result<()> {
        self.run(Phase::Lint).await
    }

    /// Produces build output.
    ///
    /// # Errors
    ///
    /// See [`run`](Self::run).
    pub async fn build(&mut self) -> Result<()> {
        self.run(Phase::Build).await
    }

    /// Generates documentation.
    ///
    /// # Errors
    ///
    /// See [`run`](Self::run).
    pub async fn docs(&mut self) -> Result<()> {
        self.run(Phase::Docs).await
    }

    /// Ends the command. No phase can run afterwards.
    ///
    /// # Errors
    ///
    /// See [`run`](Self::run).
    pub async fn finalize(&mut self) -> Result<()> {
        self.run(Phase::Finalize).await
    }

    /// Runs `phase`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidState` if the engine is not ready. Any other
    /// failure is logged and returned as `Error::PhaseFailed` naming the
    /// phase, with the original error as its source.
    pub async fn run(&mut self, phase: Phase) -> Result<()> {
        if self.state != EngineState::Ready {
            let err = Error::InvalidState {
                phase,
                state: self.state,
            };
            self.session.log().error(&err.to_string());
            return Err(err);
        }

        self.state = phase.state();
        tracing::info!(phase = %phase, "Running phase");
        let result = self.execute(phase).await;
        self.finish(phase, result)
    }

    async fn execute(&mut self, phase: Phase) -> Result<()> {
        if phase.is_stale_sensitive() {
            self.ensure_fresh(phase).await?;
        }

        match phase {
            Phase::Prepare => self.run_prepare().await,
            Phase::Clean => self.run_clean().await,
            Phase::Build => {
                let variant = self.session.config().project_type.as_str();
                for stage in ["begin", variant, "complete"] {
                    self.call_stage(phase, stage).await?;
                }
                Ok(())
            }
            Phase::New | Phase::Lint | Phase::Docs | Phase::Finalize => {
                self.call_stages(phase).await
            }
        }
    }

    fn finish(&mut self, phase: Phase, result: Result<()>) -> Result<()> {
        match result {
            Ok(()) => {
                self.state = if phase == Phase::Finalize {
                    EngineState::Done
                } else {
                    EngineState::Ready
                };
                tracing::info!(phase = %phase, "Phase complete");
                Ok(())
            }
            Err(source) => {
                self.state = EngineState::Error;
                self.session
                    .log()
                    .error(&format!("Phase '{phase}' failed: {source}"));
                tracing::debug!(phase = %phase, error = ?source, "Phase failure detail");
                Err(Error::PhaseFailed {
                    phase,
                    source: Box::new(source),
                })
            }
        }
    }

    /// Runs `prepare` first if generated files do not match the tree.
    async fn ensure_fresh(&mut self, phase: Phase) -> Result<()> {
        if phase == Phase::Build {
            self.refresh_checksum().await?;
        }

        if self.session.is_cache_valid() {
            tracing::debug!(phase = %phase, "Generated files are fresh");
            return Ok(());
        }

        tracing::debug!(
            phase = %phase,
            checksum = %self.session.checksum().short(12),
            "Generated files are stale, running prepare"
        );
        self.state = EngineState::Preparing;
        let result = self.run_prepare().await;
        self.state = phase.state();

        result.map_err(|source| Error::PhaseFailed {
            phase: Phase::Prepare,
            source: Box::new(source),
        })
    }

    async fn run_prepare(&mut self) -> Result<()> {
        self.session.vfs_mut().clear();
        self.session.start_build();

        for stage in PREPARE_STAGES {
            self.call_stage(Phase::Prepare, stage).await?;
        }

        self.refresh_checksum().await?;
        self.persist()
    }

    async fn run_clean(&mut self) -> Result<()> {
        self.call_stage(Phase::Clean, "begin").await?;

        if self.store.clear()? {
            tracing::debug!("Removed persisted metadata");
        }
        self.session.vfs_mut().clear();
        self.session.set_meta(None);

        let output = self.session.output_path();
        remove_dir(output).await?;

        self.call_stage(Phase::Clean, "complete").await
    }

    async fn call_stages(&mut self, phase: Phase) -> Result<()> {
        self.call_stage(phase, "begin").await?;
        self.call_stage(phase, "complete").await
    }

    async fn call_stage(&mut self, phase: Phase, stage: &str) -> Result<()> {
        let hook = phase.hook(stage);
        let ran = self
            .dispatcher
            .call_hook(&hook, &mut self.session, &[])
            .await?;
        tracing::trace!(hook = %hook, handlers = ran, "Hook complete");
        Ok(())
    }

    async fn refresh_checksum(&mut self) -> Result<()> {
        let checksum = hash_tree(self.session.root().to_path_buf(), self.filter.clone()).await?;
        self.session.set_checksum(checksum);
        Ok(())
    }

    fn persist(&mut self) -> Result<()> {
        let meta = PersistedMeta::capture(
            self.session.checksum().clone(),
            self.session.build_id(),
            self.session.release_id(),
            project_root_hash(self.session.root()),
            self.session.vfs(),
        );
        self.store.save(&meta)?;
        tracing::debug!(
            build_id = %meta.build_id,
            files = meta.virtual_files.len(),
            "Persisted generated files"
        );
        self.session.set_meta(Some(meta));
        Ok(())
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("state", &self.state)
            .field("plugins", &self.plugin_identifiers())
            .field("dispatcher", &self.dispatcher)
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

/// Exclusions for the project checksum: defaults, output and data
/// directories, and configured names.
fn checksum_filter(config: &ProjectConfig, store: &MetaStore) -> TreeFilter {
    config.checksum.exclude.iter().fold(
        TreeFilter::default()
            .exclude_path(config.output_path())
            .exclude_path(store.data_dir()),
        |filter, name| filter.exclude_name(name.as_str()),
    )
}

async fn hash_tree(root: PathBuf, filter: TreeFilter) -> Result<ContentHash> {
    let checksum = tokio::task::spawn_blocking(move || checksum_tree(&root, &filter)).await??;
    tracing::debug!(checksum = %checksum.short(12), "Computed project checksum");
    Ok(checksum)
}

/// Restores the persisted VFS if it was generated from the live tree.
fn restore_vfs(session: &mut BuildSession) {
    if !session.is_cache_valid() {
        return;
    }
    let Some(snapshot) = session.meta().map(PersistedMeta::snapshot) else {
        return;
    };

    match session.vfs_mut().restore(&snapshot) {
        Ok(()) => tracing::debug!(
            files = session.vfs().file_count(),
            "Restored generated files from persisted metadata"
        ),
        Err(e) => {
            tracing::warn!("Ignoring unusable persisted snapshot: {e}");
            session.set_meta(None);
        }
    }
}

async fn remove_dir(path: PathBuf) -> Result<()> {
    match tokio::fs::remove_dir_all(&path).await {
        Ok(()) => {
            tracing::debug!("Removed {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(Error::Io { path, source }),
    }
}
