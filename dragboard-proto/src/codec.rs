//! Binary encoding for persisted document collections.
//!
//! A collection is stored as a [`CollectionSnapshot`] encoded with postcard
//! and prefixed by a 4-byte header: three magic bytes followed by a format
//! version.
//!
//! Wire format: `[b'D' b'B' b'C'][version u8][postcard payload]`

use serde::{Deserialize, Serialize};

use crate::document::{BoardDocument, Document, DocumentId};

/// Magic bytes identifying a collection file.
pub const MAGIC: [u8; 3] = *b"DBC";

/// Current format version.
pub const FORMAT_VERSION: u8 = 1;

const HEADER_LEN: usize = MAGIC.len() + 1;

/// Error type for codec encode/decode operations.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),
    /// The header is missing, has the wrong magic, or an unknown version.
    #[error("invalid header: {0}")]
    InvalidHeader(String),
}

/// Every document of one collection, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSnapshot {
    /// Documents in the order they were first created.
    pub documents: Vec<Document>,
}

impl CollectionSnapshot {
    /// Returns the fields of the document with the given id.
    #[must_use]
    pub fn get(&self, id: &DocumentId) -> Option<&BoardDocument> {
        self.documents
            .iter()
            .find(|d| d.id == *id)
            .map(|d| &d.fields)
    }

    /// Returns a mutable reference to the fields of the given document.
    pub fn get_mut(&mut self, id: &DocumentId) -> Option<&mut BoardDocument> {
        self.documents
            .iter_mut()
            .find(|d| d.id == *id)
            .map(|d| &mut d.fields)
    }

    /// Overwrites the document's fields, appending it if it is new.
    pub fn upsert(&mut self, id: DocumentId, fields: BoardDocument) {
        if let Some(existing) = self.get_mut(&id) {
            *existing = fields;
        } else {
            self.documents.push(Document { id, fields });
        }
    }
}

/// Encodes a [`CollectionSnapshot`] with its header.
///
/// # Errors
///
/// Returns `CodecError::Serialization` if the snapshot cannot be serialized.
pub fn encode(snapshot: &CollectionSnapshot) -> Result<Vec<u8>, CodecError> {
    let payload =
        postcard::to_allocvec(snapshot).map_err(|e| CodecError::Serialization(e.to_string()))?;
    let mut out = Vec::with_capacity(HEADER_LEN + payload.len());
    out.extend_from_slice(&MAGIC);
    out.push(FORMAT_VERSION);
    out.extend_from_slice(&payload);
    Ok(out)
}

/// Decodes a [`CollectionSnapshot`], validating its header.
///
/// # Errors
///
/// Returns `CodecError::InvalidHeader` if the header is short, carries the
/// wrong magic, or names an unsupported version, and
/// `CodecError::Serialization` if the payload cannot be deserialized.
pub fn decode(bytes: &[u8]) -> Result<CollectionSnapshot, CodecError> {
    if bytes.len() < HEADER_LEN {
        return Err(CodecError::InvalidHeader(format!(
            "need at least {HEADER_LEN} bytes, got {}",
            bytes.len()
        )));
    }
    if bytes[..MAGIC.len()] != MAGIC {
        return Err(CodecError::InvalidHeader("bad magic".to_string()));
    }
    let version = bytes[MAGIC.len()];
    if version != FORMAT_VERSION {
        return Err(CodecError::InvalidHeader(format!(
            "unsupported version {version}"
        )));
    }
    postcard::from_bytes(&bytes[HEADER_LEN..]).map_err(|e| CodecError::Serialization(e.to_string()))
}
