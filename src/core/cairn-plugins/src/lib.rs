//! # Cairn Plugins
//!
//! Plugin contracts and the startup sequence that binds each plugin to its
//! persisted configuration.
//!
//! ## Startup
//!
//! [`PluginHost::start`] ensures the `_configuration` collection, then for
//! each registered plugin, in registration order:
//!
//! 1. [`bootstrap_plugin`] loads (or creates from defaults) the plugin's
//!    configuration record and hands the typed value to the plugin
//! 2. the plugin's own [`Plugin::on_start`] hook runs
//!
//! and finally ensures the `_schema` collection. Plugins opt into
//! configuration by implementing [`Configurable`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod bootstrap;
pub mod error;
pub mod host;
pub mod plugin;

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod testing;

pub use bootstrap::{
    bootstrap_plugin, BootstrapStatus, ConfigRecord, CONFIGURATION_COLLECTION,
    PLUGIN_NAME_FIELD, SCHEMA_COLLECTION,
};
pub use error::{BootstrapError, PluginError};
pub use host::{PluginHost, PluginReport};
pub use plugin::{Configurable, ErasedConfigurable, Plugin};
