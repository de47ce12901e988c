//! Plugin traits.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use cairn_storage::DocumentStore;

use crate::PluginError;

/// An independently registered unit of CMS functionality.
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Fully-qualified plugin name (e.g. `cairn.core`).
    ///
    /// Used as the key of the plugin's configuration record, so it must be
    /// unique among registered plugins and must not change between releases.
    fn name(&self) -> &str;

    /// Short human-readable description.
    fn description(&self) -> &str {
        ""
    }

    /// Returns the plugin's configuration capability, if it has one.
    ///
    /// Plugins implementing [`Configurable`] override this to return
    /// `Some(self)`.
    fn configurable(&mut self) -> Option<&mut dyn ErasedConfigurable> {
        None
    }

    /// Runs once at startup, after the plugin's configuration is bound.
    async fn on_start(&mut self, _store: &dyn DocumentStore) -> Result<(), PluginError> {
        Ok(())
    }
}

/// A plugin with a typed, persisted configuration.
///
/// # Example
///
/// ```
/// use cairn_plugins::{Configurable, ErasedConfigurable, Plugin};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
/// struct GreeterConfig {
///     greeting: String,
/// }
///
/// #[derive(Default)]
/// struct Greeter {
///     config: Option<GreeterConfig>,
/// }
///
/// impl Configurable for Greeter {
///     type Config = GreeterConfig;
///
///     fn default_config(&self) -> GreeterConfig {
///         GreeterConfig { greeting: "hello".into() }
///     }
///
///     fn set_actual_config(&mut self, config: GreeterConfig) {
///         self.config = Some(config);
///     }
/// }
///
/// impl Plugin for Greeter {
///     fn name(&self) -> &str {
///         "example.greeter"
///     }
///
///     fn configurable(&mut self) -> Option<&mut dyn ErasedConfigurable> {
///         Some(self)
///     }
/// }
/// ```
pub trait Configurable: Send + Sync {
    /// Configuration type, persisted as JSON.
    type Config: Serialize + DeserializeOwned;

    /// Configuration used when no record exists yet.
    ///
    /// Only consulted on the first start against a given store.
    fn default_config(&self) -> Self::Config;

    /// Adopts the bound configuration.
    fn set_actual_config(&mut self, config: Self::Config);
}

/// Object-safe form of [`Configurable`], working on JSON values.
///
/// Implemented for every [`Configurable`] type; plugins never implement it
/// directly.
pub trait ErasedConfigurable: Send + Sync {
    /// Serializes the default configuration.
    fn default_config_value(&self) -> Result<Value, serde_json::Error>;

    /// Deserializes `value` into the configuration type and adopts it.
    ///
    /// On error the plugin is left untouched.
    fn apply_config_value(&mut self, value: Value) -> Result<(), serde_json::Error>;
}

impl<T: Configurable> ErasedConfigurable for T {
    fn default_config_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self.default_config())
    }

    fn apply_config_value(&mut self, value: Value) -> Result<(), serde_json::Error> {
        let config = serde_json::from_value::<T::Config>(value)?;
        self.set_actual_config(config);
        Ok(())
    }
}
