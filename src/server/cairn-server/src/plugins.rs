//! Built-in plugins.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use cairn_plugins::{Configurable, ErasedConfigurable, Plugin, PluginError};
use cairn_storage::DocumentStore;

/// Core CMS plugin. Always registered first.
#[derive(Debug, Default)]
pub struct CorePlugin;

impl CorePlugin {
    /// Plugin name.
    pub const NAME: &'static str = "cairn.core";
}

#[async_trait]
impl Plugin for CorePlugin {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Cairn core services"
    }

    async fn on_start(&mut self, _store: &dyn DocumentStore) -> Result<(), PluginError> {
        info!(version = env!("CARGO_PKG_VERSION"), "Cairn core started");
        Ok(())
    }
}

/// Runtime switch for logging successful authentications.
///
/// Shared between [`AuthAuditPlugin`] and the auth middleware.
#[derive(Debug, Clone, Default)]
pub struct AuditSwitch(Arc<AtomicBool>);

impl AuditSwitch {
    /// Whether successful authentications are logged.
    pub fn enabled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    fn set(&self, enabled: bool) {
        self.0.store(enabled, Ordering::Relaxed);
    }
}

/// Persisted configuration of [`AuthAuditPlugin`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Log every successful authentication at `info`.
    pub log_successes: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            log_successes: true,
        }
    }
}

/// Audit logging of successful authentications.
#[derive(Debug, Default)]
pub struct AuthAuditPlugin {
    switch: AuditSwitch,
}

impl AuthAuditPlugin {
    /// Plugin name.
    pub const NAME: &'static str = "cairn.auth-audit";

    /// Creates the plugin driving `switch`.
    pub fn new(switch: AuditSwitch) -> Self {
        Self { switch }
    }
}

impl Configurable for AuthAuditPlugin {
    type Config = AuditConfig;

    fn default_config(&self) -> AuditConfig {
        AuditConfig::default()
    }

    fn set_actual_config(&mut self, config: AuditConfig) {
        self.switch.set(config.log_successes);
    }
}

#[async_trait]
impl Plugin for AuthAuditPlugin {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Audit log of successful authentications"
    }

    fn configurable(&mut self) -> Option<&mut dyn ErasedConfigurable> {
        Some(self)
    }

    async fn on_start(&mut self, _store: &dyn DocumentStore) -> Result<(), PluginError> {
        info!(log_successes = self.switch.enabled(), "Authentication audit ready");
        Ok(())
    }
}
