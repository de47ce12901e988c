//! Per-plugin configuration bootstrap.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use cairn_storage::{Document, DocumentStore, Filter};

use crate::{BootstrapError, Plugin};

/// Collection holding one configuration record per plugin.
pub const CONFIGURATION_COLLECTION: &str = "_configuration";
/// Collection holding content schemas.
pub const SCHEMA_COLLECTION: &str = "_schema";
/// Record field holding the plugin name.
pub const PLUGIN_NAME_FIELD: &str = "plugin_name";

/// Persisted configuration of one plugin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigRecord {
    /// Fully-qualified plugin name.
    pub plugin_name: String,
    /// Serialized configuration value.
    pub data: Value,
}

impl ConfigRecord {
    fn into_document(self) -> Document {
        let mut document = Document::new();
        document.insert(PLUGIN_NAME_FIELD.to_string(), Value::String(self.plugin_name));
        document.insert("data".to_string(), self.data);
        document
    }
}

/// What the bootstrap did for a plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BootstrapStatus {
    /// Plugin is not configurable; nothing was read or written.
    Skipped,
    /// No record existed; one was created from the plugin's defaults.
    Created,
    /// An existing record was bound.
    Existing,
}

/// Binds `plugin` to its persisted configuration.
///
/// Looks up the plugin's record in [`CONFIGURATION_COLLECTION`], inserting
/// one built from [`Configurable::default_config`](crate::Configurable::default_config)
/// if none exists, then deserializes the record's `data` and hands it to the
/// plugin. Existing records are never overwritten. If several records exist
/// for the same plugin the first one found is used.
///
/// # Errors
///
/// - [`BootstrapError::Storage`] if the store fails
/// - [`BootstrapError::ConfigShapeMismatch`] if the stored record cannot be
///   deserialized into the plugin's configuration type; the plugin receives
///   nothing in that case
/// - [`BootstrapError::DefaultConfig`] if the default cannot be serialized
pub async fn bootstrap_plugin(
    plugin: &mut dyn Plugin,
    store: &dyn DocumentStore,
) -> Result<BootstrapStatus, BootstrapError> {
    let name = plugin.name().to_string();

    let Some(configurable) = plugin.configurable() else {
        debug!(plugin = %name, "Plugin is not configurable, skipping");
        return Ok(BootstrapStatus::Skipped);
    };

    let filter = Filter::new().eq(PLUGIN_NAME_FIELD, name.as_str());
    let existing = store.query(CONFIGURATION_COLLECTION, &filter, 1, 1).await?;

    if existing.total_count > 1 {
        warn!(
            plugin = %name,
            records = existing.total_count,
            "Duplicate configuration records, using the first"
        );
    }

    let (data, status) = match existing.items.into_iter().next() {
        Some(document) => {
            let record = serde_json::from_value::<ConfigRecord>(Value::Object(document))
                .map_err(|source| shape_mismatch(&name, source))?;
            (record.data, BootstrapStatus::Existing)
        },
        None => {
            let data = configurable
                .default_config_value()
                .map_err(|source| BootstrapError::DefaultConfig {
                    plugin: name.clone(),
                    source,
                })?;

            let record = ConfigRecord {
                plugin_name: name.clone(),
                data: data.clone(),
            };
            store
                .insert(CONFIGURATION_COLLECTION, record.into_document())
                .await?;

            info!(plugin = %name, "Created default configuration record");
            (data, BootstrapStatus::Created)
        },
    };

    configurable
        .apply_config_value(data)
        .map_err(|source| shape_mismatch(&name, source))?;

    debug!(plugin = %name, status = ?status, "Plugin configuration bound");

    Ok(status)
}

fn shape_mismatch(plugin: &str, source: serde_json::Error) -> BootstrapError {
    error!(plugin = %plugin, error = %source, "Stored configuration does not match plugin config type");
    BootstrapError::ConfigShapeMismatch {
        plugin: plugin.to_string(),
        source,
    }
}
