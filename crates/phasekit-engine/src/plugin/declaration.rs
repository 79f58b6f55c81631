//! Plugin declarations.

use crate::error::{Error, Result};
use crate::plugin::{Plugin, PluginOptions};
use serde_json::Value;

/// A reference to a plugin, as written in configuration or returned from
/// [`Plugin::dependencies`].
///
/// # Examples
///
/// ```
/// use phasekit_engine::PluginDeclaration;
/// use serde_json::json;
///
/// let named = PluginDeclaration::from_value(&json!("@acme/router")).unwrap();
/// assert_eq!(named.specifier(), Some("@acme/router"));
///
/// let tuple = PluginDeclaration::from_value(&json!(["@acme/router", { "base": "/app" }])).unwrap();
/// let object = PluginDeclaration::from_value(&json!({ "plugin": "@acme/router", "props": { "base": "/app" } })).unwrap();
/// assert_eq!(tuple.props(), object.props());
///
/// assert!(PluginDeclaration::from_value(&json!(42)).is_err());
/// ```
#[derive(Debug)]
pub enum PluginDeclaration {
    /// A specifier without options
    Named(String),
    /// A specifier with options
    Configured {
        /// Module specifier
        specifier: String,
        /// Options passed to the plugin
        props: PluginOptions,
    },
    /// A ready-made plugin
    Instance(Box<dyn Plugin>),
}

impl PluginDeclaration {
    /// Declares a plugin by specifier.
    pub fn named(specifier: impl Into<String>) -> Self {
        Self::Named(specifier.into())
    }

    /// Declares a plugin by specifier with options.
    pub fn configured(specifier: impl Into<String>, props: PluginOptions) -> Self {
        Self::Configured {
            specifier: specifier.into(),
            props,
        }
    }

    /// Wraps a ready-made plugin.
    pub fn instance(plugin: impl Plugin + 'static) -> Self {
        Self::Instance(Box::new(plugin))
    }

    /// Parses a declaration from configuration.
    ///
    /// Accepted shapes are `"name"`, `["name"]`, `["name", {props}]` and
    /// `{"plugin": "name", "props": {props}}`. A `null` props value counts
    /// as no props.
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` for any other shape or an empty name.
    pub fn from_value(value: &Value) -> Result<Self> {
        let (specifier, props) = match value {
            Value::String(name) => (name, None),
            Value::Array(items) => match items.as_slice() {
                [Value::String(name)] => (name, None),
                [Value::String(name), props] => (name, Some(props)),
                _ => return Err(malformed(value)),
            },
            Value::Object(map) => match map.get("plugin") {
                Some(Value::String(name)) => (name, map.get("props")),
                _ => return Err(malformed(value)),
            },
            _ => return Err(malformed(value)),
        };

        if specifier.trim().is_empty() {
            return Err(malformed(value));
        }

        match props {
            None | Some(Value::Null) => Ok(Self::named(specifier.as_str())),
            Some(Value::Object(props)) => Ok(Self::configured(specifier.as_str(), props.clone())),
            Some(_) => Err(Error::Configuration {
                message: format!("props of plugin '{specifier}' must be an object"),
            }),
        }
    }

    /// Returns the specifier, or `None` for an instance.
    #[must_use]
    pub fn specifier(&self) -> Option<&str> {
        match self {
            Self::Named(specifier) | Self::Configured { specifier, .. } => Some(specifier),
            Self::Instance(_) => None,
        }
    }

    /// Returns the declared options, or `None` if there are none.
    #[must_use]
    pub const fn props(&self) -> Option<&PluginOptions> {
        match self {
            Self::Configured { props, .. } => Some(props),
            Self::Named(_) | Self::Instance(_) => None,
        }
    }
}

fn malformed(value: &Value) -> Error {
    Error::Configuration {
        message: format!(
            "invalid plugin declaration {value}: expected \"name\", [\"name\", {{props}}] or {{ plugin = \"name\", props = {{...}} }}"
        ),
    }
}
