//! In-memory document store.
//!
//! Used in dev mode and by tests across the workspace. Data lives only as
//! long as the store value.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::backend::DocumentStore;
use crate::document::{check_query, validate_collection_name, Document, DocumentId, Filter, ItemList};
use crate::error::StorageError;

#[derive(Default)]
struct Inner {
    collections: BTreeMap<String, Vec<(DocumentId, Document)>>,
    next_id: i64,
}

/// Document store held entirely in memory.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the names of all existing collections, sorted.
    pub async fn collection_names(&self) -> Vec<String> {
        self.inner.read().await.collections.keys().cloned().collect()
    }

    /// Returns the number of documents in `collection` (0 if missing).
    pub async fn count(&self, collection: &str) -> usize {
        self.inner
            .read()
            .await
            .collections
            .get(collection)
            .map_or(0, Vec::len)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn ensure_collection(&self, collection: &str) -> Result<(), StorageError> {
        validate_collection_name(collection)?;

        let mut inner = self.inner.write().await;
        if !inner.collections.contains_key(collection) {
            debug!(collection = %collection, "Creating collection");
            inner.collections.insert(collection.to_string(), Vec::new());
        }
        Ok(())
    }

    async fn query(
        &self,
        collection: &str,
        filter: &Filter,
        page: u32,
        page_size: u32,
    ) -> Result<ItemList, StorageError> {
        let offset = check_query(collection, filter, page, page_size)?;

        let inner = self.inner.read().await;
        let Some(documents) = inner.collections.get(collection) else {
            return Ok(ItemList::default());
        };

        let matching: Vec<&Document> = documents
            .iter()
            .map(|(_, doc)| doc)
            .filter(|doc| filter.matches(doc))
            .collect();

        let items = matching
            .iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(page_size as usize)
            .map(|doc| (*doc).clone())
            .collect();

        Ok(ItemList {
            total_count: matching.len() as u64,
            items,
        })
    }

    async fn insert(
        &self,
        collection: &str,
        document: Document,
    ) -> Result<DocumentId, StorageError> {
        validate_collection_name(collection)?;

        let mut inner = self.inner.write().await;
        inner.next_id += 1;
        let id = DocumentId(inner.next_id);
        inner
            .collections
            .entry(collection.to_string())
            .or_default()
            .push((id, document));

        Ok(id)
    }
}
