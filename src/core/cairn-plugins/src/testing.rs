//! Plugins and stores shared by the unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use cairn_storage::{Document, DocumentId, DocumentStore, Filter, ItemList, StorageError};

use crate::{Configurable, ErasedConfigurable, Plugin, PluginError};

pub(crate) fn doc(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        other => panic!("not an object: {other}"),
    }
}

/// Shared, ordered record of plugin hook invocations.
pub(crate) type EventLog = Arc<Mutex<Vec<String>>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct SeoConfig {
    pub site_title: String,
    pub max_items: u32,
    pub tags: Vec<String>,
}

impl Default for SeoConfig {
    fn default() -> Self {
        Self {
            site_title: "My Site".into(),
            max_items: 20,
            tags: vec!["cms".into(), "rust".into()],
        }
    }
}

/// Configurable plugin that records what happened to it.
pub(crate) struct SeoPlugin {
    name: String,
    pub config: Option<SeoConfig>,
    default_calls: AtomicUsize,
    events: Option<EventLog>,
}

impl Default for SeoPlugin {
    fn default() -> Self {
        Self::named(Self::NAME)
    }
}

impl SeoPlugin {
    pub const NAME: &'static str = "acme.seo";

    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            config: None,
            default_calls: AtomicUsize::new(0),
            events: None,
        }
    }

    pub fn with_events(mut self, events: EventLog) -> Self {
        self.events = Some(events);
        self
    }

    pub fn default_calls(&self) -> usize {
        self.default_calls.load(Ordering::SeqCst)
    }

    fn record(&self, event: &str) {
        if let Some(events) = &self.events {
            events
                .lock()
                .expect("event log poisoned")
                .push(format!("{event}:{}", self.name));
        }
    }
}

impl Configurable for SeoPlugin {
    type Config = SeoConfig;

    fn default_config(&self) -> SeoConfig {
        self.default_calls.fetch_add(1, Ordering::SeqCst);
        SeoConfig::default()
    }

    fn set_actual_config(&mut self, config: SeoConfig) {
        self.record("configure");
        self.config = Some(config);
    }
}

#[async_trait]
impl Plugin for SeoPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn configurable(&mut self) -> Option<&mut dyn ErasedConfigurable> {
        Some(self)
    }

    async fn on_start(&mut self, _store: &dyn DocumentStore) -> Result<(), PluginError> {
        self.record("start");
        Ok(())
    }
}

/// Plugin without configuration.
pub(crate) struct PlainPlugin {
    name: String,
    events: Option<EventLog>,
    fail_start: bool,
}

impl PlainPlugin {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            events: None,
            fail_start: false,
        }
    }

    pub fn with_events(mut self, events: EventLog) -> Self {
        self.events = Some(events);
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail_start = true;
        self
    }
}

#[async_trait]
impl Plugin for PlainPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    async fn on_start(&mut self, _store: &dyn DocumentStore) -> Result<(), PluginError> {
        if let Some(events) = &self.events {
            events
                .lock()
                .expect("event log poisoned")
                .push(format!("start:{}", self.name));
        }
        if self.fail_start {
            return Err(PluginError::Start("refusing to start".into()));
        }
        Ok(())
    }
}

/// Store whose every operation fails as if the database were down.
pub(crate) struct FailingStore;

#[async_trait]
impl DocumentStore for FailingStore {
    async fn ensure_collection(&self, _collection: &str) -> Result<(), StorageError> {
        Err(StorageError::ConnectionFailed("database is down".into()))
    }

    async fn query(
        &self,
        _collection: &str,
        _filter: &Filter,
        _page: u32,
        _page_size: u32,
    ) -> Result<ItemList, StorageError> {
        Err(StorageError::ConnectionFailed("database is down".into()))
    }

    async fn insert(
        &self,
        _collection: &str,
        _document: Document,
    ) -> Result<DocumentId, StorageError> {
        Err(StorageError::ConnectionFailed("database is down".into()))
    }
}
