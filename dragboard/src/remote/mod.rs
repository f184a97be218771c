//! Remote document store abstraction.
//!
//! Defines the [`DocumentStore`] trait, the minimum capability set the
//! synchronizer needs from a key-value document database. Implementations:
//! - [`memory::InMemoryDocumentStore`]: process-local store for tests and demos
//! - [`file::FileDocumentStore`]: file-per-collection store used by the CLI driver

pub mod file;
pub mod memory;

use dragboard_proto::codec::CodecError;
use dragboard_proto::document::{BoardDocument, Document, DocumentId, DocumentPatch};

/// Errors that can occur during remote store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The addressed document does not exist.
    #[error("document {collection}/{id} not found")]
    NotFound {
        /// Collection that was searched.
        collection: String,
        /// Document that was requested.
        id: DocumentId,
    },

    /// The store cannot be reached or refused the request.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Reading or writing the backing file failed.
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing data could not be encoded or decoded.
    #[error("store codec error: {0}")]
    Codec(#[from] CodecError),
}

/// Async key-value document API mirroring a board.
///
/// All calls are independent; the store gives no ordering guarantee between
/// concurrent writes and the last one to land wins.
pub trait DocumentStore: Send + Sync {
    /// Lists every document in a collection, in creation order.
    fn list_documents(
        &self,
        collection: &str,
    ) -> impl std::future::Future<Output = Result<Vec<Document>, StoreError>> + Send;

    /// Reads a document; `Ok(None)` if it does not exist.
    fn get_document(
        &self,
        collection: &str,
        id: &DocumentId,
    ) -> impl std::future::Future<Output = Result<Option<BoardDocument>, StoreError>> + Send;

    /// Overwrites a document, creating it if necessary.
    fn set_document(
        &self,
        collection: &str,
        id: &DocumentId,
        fields: BoardDocument,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Merges the named fields into an existing document.
    ///
    /// Fails with [`StoreError::NotFound`] if the document does not exist.
    fn update_document(
        &self,
        collection: &str,
        id: &DocumentId,
        patch: DocumentPatch,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Creates a document under a store-assigned id and returns that id.
    fn create_document(
        &self,
        collection: &str,
        fields: BoardDocument,
    ) -> impl std::future::Future<Output = Result<DocumentId, StoreError>> + Send;
}
