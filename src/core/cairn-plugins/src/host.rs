//! Plugin registration and startup sequencing.

use serde::Serialize;
use tracing::info;

use cairn_storage::DocumentStore;

use crate::bootstrap::{bootstrap_plugin, BootstrapStatus, CONFIGURATION_COLLECTION, SCHEMA_COLLECTION};
use crate::{BootstrapError, Plugin};

/// Startup result for one plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginReport {
    /// Plugin name.
    pub name: String,
    /// Plugin description.
    pub description: String,
    /// What the configuration bootstrap did.
    pub status: BootstrapStatus,
}

/// Owns the registered plugins and starts them in registration order.
#[derive(Default)]
pub struct PluginHost {
    plugins: Vec<Box<dyn Plugin>>,
}

impl PluginHost {
    /// Creates a host with no plugins.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a plugin. Plugins start in the order they are registered.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError::DuplicatePlugin`] if a plugin with the same
    /// name is already registered.
    pub fn register(&mut self, plugin: Box<dyn Plugin>) -> Result<(), BootstrapError> {
        if self.plugins.iter().any(|p| p.name() == plugin.name()) {
            return Err(BootstrapError::DuplicatePlugin(plugin.name().to_string()));
        }
        self.plugins.push(plugin);
        Ok(())
    }

    /// Names of the registered plugins, in start order.
    pub fn plugin_names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    /// Starts every plugin against `store`.
    ///
    /// Each plugin is fully bootstrapped (configuration bound) and its own
    /// start-up hook has returned before the next plugin is touched. The first
    /// error aborts startup; later plugins are not started.
    pub async fn start(
        &mut self,
        store: &dyn DocumentStore,
    ) -> Result<Vec<PluginReport>, BootstrapError> {
        store.ensure_collection(CONFIGURATION_COLLECTION).await?;

        let mut reports = Vec::with_capacity(self.plugins.len());
        for plugin in &mut self.plugins {
            let status = bootstrap_plugin(plugin.as_mut(), store).await?;

            plugin
                .on_start(store)
                .await
                .map_err(|source| BootstrapError::Start {
                    plugin: plugin.name().to_string(),
                    source,
                })?;

            info!(plugin = %plugin.name(), status = ?status, "Plugin started");

            reports.push(PluginReport {
                name: plugin.name().to_string(),
                description: plugin.description().to_string(),
                status,
            });
        }

        store.ensure_collection(SCHEMA_COLLECTION).await?;

        Ok(reports)
    }
}
