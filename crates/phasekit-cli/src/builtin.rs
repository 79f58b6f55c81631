//! Plugins that ship with the CLI.
//!
//! - `@phasekit/manifest` writes a JSON manifest of the generated files into
//!   the VFS as the builtin entry `phasekit:manifest`
//! - `@phasekit/emit` writes generated files into the output directory once
//!   the build completes; it depends on the manifest plugin

use async_trait::async_trait;
use phasekit_core::Logger;
use phasekit_engine::{
    BuildSession, HandlerError, HookHandler, Plugin, PluginDeclaration, PluginHooks,
    PluginOptions, PluginProps, RegistryLoader,
};
use phasekit_vfs::VfsGroup;
use serde_json::{Value, json};
use std::path::PathBuf;

/// Specifier of the manifest plugin.
pub const MANIFEST: &str = "@phasekit/manifest";

/// Specifier of the emit plugin.
pub const EMIT: &str = "@phasekit/emit";

/// Runtime id of the manifest entry.
pub const MANIFEST_ID: &str = "phasekit:manifest";

const DEFAULT_MANIFEST_PATH: &str = "/.phasekit/manifest.json";

/// Returns a loader that knows the builtin plugins.
#[must_use]
pub fn loader() -> RegistryLoader {
    let mut loader = RegistryLoader::new();
    loader
        .register_builtin(MANIFEST, |props| {
            Ok(Box::new(ManifestPlugin::new(props)) as Box<dyn Plugin>)
        })
        .register_builtin(EMIT, |props| {
            EmitPlugin::new(props).map(|plugin| Box::new(plugin) as Box<dyn Plugin>)
        });
    loader
}

/// Writes the manifest of generated files at `prepare:runtime`.
///
/// Options: `path` (VFS path of the manifest, default
/// `/.phasekit/manifest.json`).
#[derive(Debug)]
pub struct ManifestPlugin {
    options: PluginOptions,
    log: Logger,
}

impl ManifestPlugin {
    /// Creates the plugin from loader props.
    #[must_use]
    pub fn new(props: PluginProps) -> Self {
        Self {
            options: props.options,
            log: props.log,
        }
    }
}

impl Plugin for ManifestPlugin {
    fn name(&self) -> &str {
        MANIFEST
    }

    fn options(&self) -> &PluginOptions {
        &self.options
    }

    fn options_mut(&mut self) -> &mut PluginOptions {
        &mut self.options
    }

    fn add_hooks(&self, hooks: &mut PluginHooks) {
        let path = self
            .options
            .get("path")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_MANIFEST_PATH)
            .to_string();
        let log = self.log.clone();

        hooks.on_fn("prepare:runtime", move |session, _| {
            let files: Vec<Value> = session
                .vfs()
                .files()
                .filter(|(_, _, group)| *group != VfsGroup::Builtin)
                .map(|(path, file, group)| {
                    json!({ "path": path.as_str(), "group": group.as_str(), "size": file.size() })
                })
                .collect();

            let manifest = json!({
                "project": session.config().name,
                "type": session.config().project_type.as_str(),
                "buildId": session.build_id(),
                "releaseId": session.release_id(),
                "files": files,
            });
            let content = serde_json::to_string_pretty(&manifest)?;
            session.vfs_mut().write_builtin(MANIFEST_ID, &path, content)?;
            log.debug(&format!("Wrote manifest with {} entries", files.len()));
            Ok(())
        });
    }
}

/// Writes generated files into the output directory at `build:complete`.
///
/// Options: `groups` (array of `"builtin"`, `"runtime"`, `"virtual"`;
/// default runtime and virtual).
#[derive(Debug)]
pub struct EmitPlugin {
    options: PluginOptions,
    groups: Vec<VfsGroup>,
    log: Logger,
}

impl EmitPlugin {
    /// Creates the plugin from loader props.
    ///
    /// # Errors
    ///
    /// Returns a description of the problem if `groups` is not an array of
    /// known group names.
    pub fn new(props: PluginProps) -> Result<Self, String> {
        let groups = match props.options.get("groups") {
            None | Some(Value::Null) => vec![VfsGroup::Runtime, VfsGroup::Virtual],
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str()
                        .ok_or_else(|| format!("group {item} is not a string"))?
                        .parse::<VfsGroup>()
                        .map_err(|e| e.to_string())
                })
                .collect::<Result<Vec<_>, _>>()?,
            Some(other) => return Err(format!("groups must be an array, got {other}")),
        };

        Ok(Self {
            options: props.options,
            groups,
            log: props.log,
        })
    }
}

impl Plugin for EmitPlugin {
    fn name(&self) -> &str {
        EMIT
    }

    fn options(&self) -> &PluginOptions {
        &self.options
    }

    fn options_mut(&mut self) -> &mut PluginOptions {
        &mut self.options
    }

    fn dependencies(&self) -> Vec<PluginDeclaration> {
        vec![PluginDeclaration::named(MANIFEST)]
    }

    fn add_hooks(&self, hooks: &mut PluginHooks) {
        hooks.on(
            "build:complete",
            EmitFiles {
                groups: self.groups.clone(),
                log: self.log.clone(),
            },
        );
    }
}

struct EmitFiles {
    groups: Vec<VfsGroup>,
    log: Logger,
}

#[async_trait]
impl HookHandler for EmitFiles {
    async fn call(&self, session: &mut BuildSession, _args: &[Value]) -> Result<(), HandlerError> {
        let output = session.output_path();
        let files: Vec<(PathBuf, String)> = session
            .vfs()
            .files()
            .filter(|(_, _, group)| self.groups.contains(group))
            .map(|(path, file, _)| (output.join(path.relative()), file.content().to_string()))
            .collect();

        for (path, content) in &files {
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(path, content).await?;
        }

        self.log.success(&format!(
            "Emitted {} files to {}",
            files.len(),
            output.display()
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use phasekit_engine::PluginLoader;

    #[tokio::test]
    async fn test_loader_knows_builtins() {
        let loader = loader();
        assert!(loader.is_builtin(MANIFEST));
        assert!(loader.is_builtin(EMIT));

        let emit = loader.load(EMIT, PluginProps::default()).await.unwrap();
        let deps = emit.dependencies();
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].specifier(), Some(MANIFEST));
    }

    #[test]
    fn test_emit_groups_option() {
        let mut props = PluginProps::default();
        props
            .options
            .insert("groups".to_string(), json!(["builtin", "virtual"]));
        let plugin = EmitPlugin::new(props).unwrap();
        assert_eq!(plugin.groups, vec![VfsGroup::Builtin, VfsGroup::Virtual]);

        let mut props = PluginProps::default();
        props.options.insert("groups".to_string(), json!("virtual"));
        assert!(EmitPlugin::new(props).is_err());

        let mut props = PluginProps::default();
        props.options.insert("groups".to_string(), json!(["bogus"]));
        assert!(EmitPlugin::new(props).is_err());
    }
}
