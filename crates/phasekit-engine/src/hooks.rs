//! Hook handlers and the dispatcher that runs them.
//!
//! A hook is a named extension point such as `"prepare:entry"`. Plugins
//! stage handlers in a [`PluginHooks`] and the resolver hands them to the
//! [`HookDispatcher`] one plugin at a time, in dependency order. Calling a
//! hook awaits each handler before starting the next, so a handler can rely
//! on anything an earlier handler wrote to the session.

use crate::session::BuildSession;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Error type returned by hook handlers.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Behavior attached to a hook.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use phasekit_engine::{BuildSession, HandlerError, HookHandler};
/// use serde_json::Value;
///
/// struct WriteRoutes;
///
/// #[async_trait]
/// impl HookHandler for WriteRoutes {
///     async fn call(&self, session: &mut BuildSession, _args: &[Value]) -> Result<(), HandlerError> {
///         session.vfs_mut().write_virtual("/gen/routes.ts", "export const routes = [];")?;
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait HookHandler: Send + Sync {
    /// Runs the handler.
    ///
    /// # Errors
    ///
    /// Any error aborts the remaining handlers of the hook and fails the
    /// enclosing phase.
    async fn call(&self, session: &mut BuildSession, args: &[Value]) -> Result<(), HandlerError>;
}

/// Adapter turning a synchronous closure into a [`HookHandler`].
pub struct FnHandler<F>(F);

impl<F> FnHandler<F>
where
    F: Fn(&mut BuildSession, &[Value]) -> Result<(), HandlerError> + Send + Sync,
{
    /// Wraps `f`.
    pub const fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> fmt::Debug for FnHandler<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnHandler").finish_non_exhaustive()
    }
}

#[async_trait]
impl<F> HookHandler for FnHandler<F>
where
    F: Fn(&mut BuildSession, &[Value]) -> Result<(), HandlerError> + Send + Sync,
{
    async fn call(&self, session: &mut BuildSession, args: &[Value]) -> Result<(), HandlerError> {
        (self.0)(session, args)
    }
}

/// Handlers staged by one plugin.
///
/// Nothing reaches the dispatcher until the whole set is handed over with
/// [`HookDispatcher::add_hooks`].
///
/// # Examples
///
/// ```
/// use phasekit_engine::PluginHooks;
///
/// let mut hooks = PluginHooks::new();
/// hooks
///     .on_fn("prepare:begin", |session, _args| {
///         session.vfs_mut().write_virtual("/gen/a.ts", "export {};")?;
///         Ok(())
///     })
///     .on_fn("build:complete", |_session, _args| Ok(()));
///
/// assert_eq!(hooks.len(), 2);
/// ```
#[derive(Default)]
pub struct PluginHooks {
    handlers: Vec<(String, Arc<dyn HookHandler>)>,
}

impl PluginHooks {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages `handler` for `hook`.
    pub fn on(&mut self, hook: impl Into<String>, handler: impl HookHandler + 'static) -> &mut Self {
        self.handlers.push((hook.into(), Arc::new(handler)));
        self
    }

    /// Stages a synchronous closure for `hook`.
    pub fn on_fn<F>(&mut self, hook: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(&mut BuildSession, &[Value]) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        self.on(hook, FnHandler::new(f))
    }

    /// Returns the number of staged handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns `true` if nothing is staged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for PluginHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.handlers.iter().map(|(hook, _)| hook))
            .finish()
    }
}

/// A hook handler failed.
///
/// The dispatcher reports which plugin's handler failed; phase-level
/// context is added by the engine.
#[derive(Debug, thiserror::Error)]
#[error("Hook '{hook}' failed in plugin '{plugin}': {source}")]
pub struct HookError {
    /// Hook being called
    pub hook: String,
    /// Identifier of the plugin whose handler failed
    pub plugin: String,
    /// Error returned by the handler
    #[source]
    pub source: HandlerError,
}

struct Registered {
    plugin: String,
    handler: Arc<dyn HookHandler>,
}

/// Ordered handler lists keyed by hook name.
#[derive(Default)]
pub struct HookDispatcher {
    hooks: HashMap<String, Vec<Registered>>,
}

impl HookDispatcher {
    /// Creates an empty dispatcher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers every handler staged by `plugin`.
    ///
    /// Handlers are appended after those of previously added plugins and
    /// keep their staging order. Returns the number of handlers added.
    pub fn add_hooks(&mut self, plugin: &str, hooks: PluginHooks) -> usize {
        let count = hooks.len();
        for (hook, handler) in hooks.handlers {
            tracing::trace!(plugin, hook = %hook, "Registered hook handler");
            self.hooks.entry(hook).or_default().push(Registered {
                plugin: plugin.to_string(),
                handler,
            });
        }
        count
    }

    /// Returns `true` if any handler is registered for `hook`.
    #[must_use]
    pub fn has_hook(&self, hook: &str) -> bool {
        self.handler_count(hook) > 0
    }

    /// Returns the number of handlers registered for `hook`.
    #[must_use]
    pub fn handler_count(&self, hook: &str) -> usize {
        self.hooks.get(hook).map_or(0, Vec::len)
    }

    /// Returns the plugins with a handler for `hook`, in call order.
    #[must_use]
    pub fn plugins_for(&self, hook: &str) -> Vec<&str> {
        self.hooks
            .get(hook)
            .map(|handlers| handlers.iter().map(|r| r.plugin.as_str()).collect())
            .unwrap_or_default()
    }

    /// Returns every hook name with at least one handler, sorted.
    #[must_use]
    pub fn hook_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.hooks.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Calls every handler registered for `hook`, in order.
    ///
    /// Returns the number of handlers that ran. A hook with no handlers is
    /// not an error.
    ///
    /// # Errors
    ///
    /// Returns the first handler failure; later handlers do not run.
    pub async fn call_hook(
        &self,
        hook: &str,
        session: &mut BuildSession,
        args: &[Value],
    ) -> Result<usize, HookError> {
        let Some(handlers) = self.hooks.get(hook) else {
            tracing::trace!(hook, "No handlers registered");
            return Ok(0);
        };

        for registered in handlers {
            tracing::trace!(hook, plugin = %registered.plugin, "Calling hook handler");
            registered
                .handler
                .call(session, args)
                .await
                .map_err(|source| HookError {
                    hook: hook.to_string(),
                    plugin: registered.plugin.clone(),
                    source,
                })?;
        }

        Ok(handlers.len())
    }
}

impl fmt::Debug for HookDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for name in self.hook_names() {
            map.entry(&name, &self.plugins_for(name));
        }
        map.finish()
    }
}
