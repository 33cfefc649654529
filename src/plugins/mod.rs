//! Plugins shipped with the binary

pub mod container;

use std::sync::Arc;

use crate::plugin::PluginRegistry;

pub use container::ContainerPlugin;

/// Registry holding every built-in plugin
#[must_use]
pub fn builtin() -> PluginRegistry {
    PluginRegistry::new().with(Arc::new(ContainerPlugin::new()))
}
