use crate::plugin::{Plugin, PluginInstance};
use anyhow::anyhow;
use std::collections::HashMap;
use std::sync::Arc;

/// Named hook factories the host picks from when wiring its pipeline.
///
/// Filled once at startup; the host then calls [`PluginRegistry::instantiate`]
/// for each hook its config enables.
pub struct PluginRegistry {
    plugins: HashMap<String, Arc<dyn Plugin>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self {
            plugins: HashMap::new(),
        }
    }

    /// Add a factory. A later factory with the same name replaces the earlier.
    pub fn register(&mut self, plugin: Arc<dyn Plugin>) {
        let name = plugin.name().to_string();
        tracing::info!(plugin = %name, "Registered plugin");
        self.plugins.insert(name, plugin);
    }

    /// Get a plugin factory by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Plugin>> {
        self.plugins.get(name)
    }

    /// Configure the named plugin into a shareable instance.
    pub fn instantiate(
        &self,
        name: &str,
        config: &serde_json::Value,
    ) -> anyhow::Result<Arc<dyn PluginInstance>> {
        let plugin = self
            .get(name)
            .ok_or_else(|| anyhow!("unknown plugin '{name}'"))?;
        Ok(Arc::from(plugin.configure(config)?))
    }

    /// List all registered plugin names.
    pub fn list(&self) -> Vec<&str> {
        self.plugins.keys().map(|s| s.as_str()).collect()
    }

    /// Number of registered plugins.
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}
