//! File-backed document store.
//!
//! Each collection is one file, `<dir>/<collection>.board`, holding a
//! postcard-encoded [`CollectionSnapshot`]. A missing file is an empty
//! collection. Writes go to a temporary sibling that is then renamed over
//! the original, and every read-modify-write runs under one async lock.

use std::path::PathBuf;

use dragboard_proto::codec::{self, CollectionSnapshot};
use dragboard_proto::document::{BoardDocument, Document, DocumentId, DocumentPatch};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{DocumentStore, StoreError};

/// File extension of collection files.
const EXTENSION: &str = "board";

/// [`DocumentStore`] persisting each collection to a file in one directory.
pub struct FileDocumentStore {
    dir: PathBuf,
    /// Serializes read-modify-write cycles on the backing files.
    lock: Mutex<()>,
}

impl FileDocumentStore {
    /// Creates a store rooted at `dir`. The directory is created on first
    /// write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            lock: Mutex::new(()),
        }
    }

    fn collection_path(&self, collection: &str) -> PathBuf {
        self.dir.join(format!("{collection}.{EXTENSION}"))
    }

    async fn read_collection(&self, collection: &str) -> Result<CollectionSnapshot, StoreError> {
        let path = self.collection_path(collection);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(codec::decode(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(CollectionSnapshot::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_collection(
        &self,
        collection: &str,
        snapshot: &CollectionSnapshot,
    ) -> Result<(), StoreError> {
        let bytes = codec::encode(snapshot)?;
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.collection_path(collection);
        let tmp = path.with_extension(format!("{EXTENSION}.tmp"));
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;
        tracing::trace!(path = %path.display(), bytes = bytes.len(), "collection written");
        Ok(())
    }
}

impl DocumentStore for FileDocumentStore {
    async fn list_documents(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        let _guard = self.lock.lock().await;
        Ok(self.read_collection(collection).await?.documents)
    }

    async fn get_document(
        &self,
        collection: &str,
        id: &DocumentId,
    ) -> Result<Option<BoardDocument>, StoreError> {
        let _guard = self.lock.lock().await;
        Ok(self.read_collection(collection).await?.get(id).cloned())
    }

    async fn set_document(
        &self,
        collection: &str,
        id: &DocumentId,
        fields: BoardDocument,
    ) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut snapshot = self.read_collection(collection).await?;
        snapshot.upsert(id.clone(), fields);
        self.write_collection(collection, &snapshot).await
    }

    async fn update_document(
        &self,
        collection: &str,
        id: &DocumentId,
        patch: DocumentPatch,
    ) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut snapshot = self.read_collection(collection).await?;
        let doc = snapshot.get_mut(id).ok_or_else(|| StoreError::NotFound {
            collection: collection.to_string(),
            id: id.clone(),
        })?;
        patch.apply_to(doc);
        self.write_collection(collection, &snapshot).await
    }

    async fn create_document(
        &self,
        collection: &str,
        fields: BoardDocument,
    ) -> Result<DocumentId, StoreError> {
        let _guard = self.lock.lock().await;
        let mut snapshot = self.read_collection(collection).await?;
        let id = DocumentId::new(Uuid::now_v7().to_string());
        snapshot.upsert(id.clone(), fields);
        self.write_collection(collection, &snapshot).await?;
        Ok(id)
    }
}
