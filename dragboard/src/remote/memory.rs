//! In-memory document store.
//!
//! Holds every collection in a process-local map. Data is lost when the
//! store is dropped. Clones share the same underlying data, so a test can
//! keep a handle and inspect what a session wrote.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dragboard_proto::codec::CollectionSnapshot;
use dragboard_proto::document::{BoardDocument, Document, DocumentId, DocumentPatch};
use parking_lot::Mutex;

use super::{DocumentStore, StoreError};

/// Process-local [`DocumentStore`] keyed by collection name.
#[derive(Clone, Default)]
pub struct InMemoryDocumentStore {
    collections: Arc<Mutex<HashMap<String, CollectionSnapshot>>>,
    next_auto_id: Arc<AtomicU64>,
}

impl InMemoryDocumentStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with one document.
    #[must_use]
    pub fn with_document(collection: &str, id: &str, fields: BoardDocument) -> Self {
        let store = Self::new();
        store
            .collections
            .lock()
            .entry(collection.to_string())
            .or_default()
            .upsert(DocumentId::new(id), fields);
        store
    }

    /// Returns a copy of a document's fields, bypassing the async API.
    #[must_use]
    pub fn snapshot(&self, collection: &str, id: &DocumentId) -> Option<BoardDocument> {
        self.collections
            .lock()
            .get(collection)
            .and_then(|c| c.get(id))
            .cloned()
    }

    /// Number of documents in a collection.
    #[must_use]
    pub fn document_count(&self, collection: &str) -> usize {
        self.collections
            .lock()
            .get(collection)
            .map_or(0, |c| c.documents.len())
    }
}

impl DocumentStore for InMemoryDocumentStore {
    async fn list_documents(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        Ok(self
            .collections
            .lock()
            .get(collection)
            .map(|c| c.documents.clone())
            .unwrap_or_default())
    }

    async fn get_document(
        &self,
        collection: &str,
        id: &DocumentId,
    ) -> Result<Option<BoardDocument>, StoreError> {
        Ok(self.snapshot(collection, id))
    }

    async fn set_document(
        &self,
        collection: &str,
        id: &DocumentId,
        fields: BoardDocument,
    ) -> Result<(), StoreError> {
        self.collections
            .lock()
            .entry(collection.to_string())
            .or_default()
            .upsert(id.clone(), fields);
        Ok(())
    }

    async fn update_document(
        &self,
        collection: &str,
        id: &DocumentId,
        patch: DocumentPatch,
    ) -> Result<(), StoreError> {
        let mut collections = self.collections.lock();
        let doc = collections
            .get_mut(collection)
            .and_then(|c| c.get_mut(id))
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.clone(),
            })?;
        patch.apply_to(doc);
        Ok(())
    }

    async fn create_document(
        &self,
        collection: &str,
        fields: BoardDocument,
    ) -> Result<DocumentId, StoreError> {
        let n = self.next_auto_id.fetch_add(1, Ordering::Relaxed) + 1;
        let id = DocumentId::new(format!("doc-{n}"));
        self.collections
            .lock()
            .entry(collection.to_string())
            .or_default()
            .upsert(id.clone(), fields);
        Ok(id)
    }
}
