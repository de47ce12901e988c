//! Document store trait definition.

use async_trait::async_trait;

use crate::document::{Document, DocumentId, Filter, ItemList};
use crate::error::StorageError;

/// Storage trait for collection-oriented JSON document stores.
///
/// Collections are created implicitly by [`insert`](DocumentStore::insert);
/// [`ensure_collection`](DocumentStore::ensure_collection) exists so startup
/// code can guarantee a collection is present before anything is written.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Creates the collection if it does not exist yet. Idempotent.
    async fn ensure_collection(&self, collection: &str) -> Result<(), StorageError>;

    /// Returns one page of the documents in `collection` matching `filter`.
    ///
    /// Pages are 1-based. Results come back in insertion order and
    /// `total_count` counts every match, not just the returned page. Querying
    /// a collection that does not exist returns an empty list.
    async fn query(
        &self,
        collection: &str,
        filter: &Filter,
        page: u32,
        page_size: u32,
    ) -> Result<ItemList, StorageError>;

    /// Appends a document to `collection` and returns its identifier.
    async fn insert(&self, collection: &str, document: Document)
        -> Result<DocumentId, StorageError>;

    /// Returns the first document matching `filter`, if any.
    async fn find_first(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Document>, StorageError> {
        Ok(self
            .query(collection, filter, 1, 1)
            .await?
            .items
            .into_iter()
            .next())
    }
}
