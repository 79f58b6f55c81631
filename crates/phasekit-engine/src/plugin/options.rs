//! Option merging and the per-run options store.

use crate::plugin::PluginOptions;
use serde_json::Value;
use std::collections::BTreeMap;

/// Merges option layers; earlier layers take precedence.
///
/// Keys present in an earlier layer keep their value. Nested objects are
/// merged recursively with the same rule. A `null` value never overrides
/// anything, and a key whose value is still `null` is filled from a later
/// layer.
///
/// # Examples
///
/// ```
/// use phasekit_engine::merge_options;
/// use serde_json::json;
///
/// let own = json!({ "base": "/app", "nested": { "a": 1 } });
/// let recorded = json!({ "base": "/", "nested": { "b": 2 }, "extra": true });
///
/// let merged = merge_options([
///     own.as_object().unwrap(),
///     recorded.as_object().unwrap(),
/// ]);
/// assert_eq!(
///     serde_json::Value::Object(merged),
///     json!({ "base": "/app", "nested": { "a": 1, "b": 2 }, "extra": true })
/// );
/// ```
#[must_use]
pub fn merge_options<'a>(layers: impl IntoIterator<Item = &'a PluginOptions>) -> PluginOptions {
    let mut merged = PluginOptions::new();
    for layer in layers {
        fill_missing(&mut merged, layer);
    }
    merged
}

fn fill_missing(target: &mut PluginOptions, source: &PluginOptions) {
    for (key, value) in source {
        if value.is_null() {
            continue;
        }
        match target.get_mut(key) {
            None => {
                target.insert(key.clone(), value.clone());
            }
            Some(existing) if existing.is_null() => *existing = value.clone(),
            Some(Value::Object(existing)) => {
                if let Value::Object(incoming) = value {
                    fill_missing(existing, incoming);
                }
            }
            Some(_) => {}
        }
    }
}

/// Effective options keyed by plugin name or identifier.
///
/// Seeded from `[plugin_options]` in the project configuration and updated
/// as the resolver settles each plugin, so hook handlers can look up any
/// plugin's final options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionsStore {
    entries: BTreeMap<String, PluginOptions>,
}

impl OptionsStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with configured options.
    #[must_use]
    pub fn from_config(options: &BTreeMap<String, PluginOptions>) -> Self {
        Self {
            entries: options.clone(),
        }
    }

    /// Returns the options recorded under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&PluginOptions> {
        self.entries.get(key)
    }

    /// Records `options` under `key`, replacing any previous entry.
    pub fn record(&mut self, key: impl Into<String>, options: PluginOptions) {
        self.entries.insert(key.into(), options);
    }

    /// Returns the recorded keys, sorted.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Returns the number of recorded entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
