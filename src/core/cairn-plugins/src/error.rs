//! Plugin error types.

use cairn_storage::StorageError;
use thiserror::Error;

/// Errors raised by a plugin's own hooks.
#[derive(Debug, Error)]
pub enum PluginError {
    /// The plugin could not start.
    #[error("plugin failed to start: {0}")]
    Start(String),

    /// Storage error inside a plugin hook.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Errors that abort plugin startup.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// The document store failed or is unreachable.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// The persisted configuration no longer fits the plugin's config type.
    #[error("configuration for plugin '{plugin}' does not match its expected shape: {source}")]
    ConfigShapeMismatch {
        /// Plugin name.
        plugin: String,
        /// Deserialization failure.
        source: serde_json::Error,
    },

    /// The plugin's default configuration could not be serialized.
    #[error("default configuration for plugin '{plugin}' cannot be serialized: {source}")]
    DefaultConfig {
        /// Plugin name.
        plugin: String,
        /// Serialization failure.
        source: serde_json::Error,
    },

    /// Two registered plugins share a name.
    #[error("plugin '{0}' is already registered")]
    DuplicatePlugin(String),

    /// A plugin's start-up hook failed.
    #[error("plugin '{plugin}' failed to start: {source}")]
    Start {
        /// Plugin name.
        plugin: String,
        /// Hook failure.
        source: PluginError,
    },
}
