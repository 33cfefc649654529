//! Registry mapping plugin names to implementations

use std::collections::BTreeMap;
use std::sync::Arc;

use super::Plugin;

/// Name-to-plugin mapping populated once at startup
///
/// Registration takes `&mut self`; once the registry is shared (usually in an
/// `Arc`) it can only be read.
#[derive(Debug, Default, Clone)]
pub struct PluginRegistry {
    plugins: BTreeMap<String, Arc<dyn Plugin>>,
}

impl PluginRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `plugin` under its own name
    ///
    /// A plugin with the same name replaces the previous registration, which
    /// is returned.
    pub fn register(&mut self, plugin: Arc<dyn Plugin>) -> Option<Arc<dyn Plugin>> {
        let name = plugin.name().to_string();
        log::debug!("registering plugin {name} {}", plugin.version());
        self.plugins.insert(name, plugin)
    }

    /// Builder form of [`PluginRegistry::register`]
    #[must_use]
    pub fn with(mut self, plugin: Arc<dyn Plugin>) -> Self {
        self.register(plugin);
        self
    }

    /// Look up a plugin by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn Plugin>> {
        self.plugins.get(name).cloned()
    }

    /// Whether `name` is registered
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.plugins.contains_key(name)
    }

    /// Registered plugins, sorted by name
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn Plugin>)> {
        self.plugins.iter().map(|(name, plugin)| (name.as_str(), plugin))
    }

    /// Number of registered plugins
    #[must_use]
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Whether no plugin is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}
