//! Remote document shape mirroring a board.
//!
//! A board is persisted as one document with two fields, `AllCols` and
//! `AllTasks`. Documents live in a named collection and are addressed by a
//! [`DocumentId`]. Field-level merges are expressed as a [`DocumentPatch`].

use serde::{Deserialize, Serialize};

use crate::board::{Board, Column, Task};

/// Name of the collection boards are stored in unless configured otherwise.
pub const DEFAULT_COLLECTION: &str = "notes";

/// Identifier of a document within a collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Wraps an existing document identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fields of a board document.
///
/// A missing field deserializes as an empty sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardDocument {
    /// Columns in display order.
    #[serde(rename = "AllCols")]
    pub all_cols: Vec<Column>,
    /// Global task sequence.
    #[serde(rename = "AllTasks")]
    pub all_tasks: Vec<Task>,
}

impl BoardDocument {
    /// Builds a document holding only the given columns.
    #[must_use]
    pub const fn with_columns(all_cols: Vec<Column>) -> Self {
        Self {
            all_cols,
            all_tasks: Vec::new(),
        }
    }

    /// Converts the document into a board bound to `id`.
    #[must_use]
    pub fn into_board(self, id: impl Into<String>) -> Board {
        Board {
            id: id.into(),
            columns: self.all_cols,
            tasks: self.all_tasks,
        }
    }
}

/// A partial update naming the fields to overwrite.
///
/// `None` leaves the stored field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentPatch {
    /// Replacement for `AllCols`.
    #[serde(rename = "AllCols", skip_serializing_if = "Option::is_none")]
    pub all_cols: Option<Vec<Column>>,
    /// Replacement for `AllTasks`.
    #[serde(rename = "AllTasks", skip_serializing_if = "Option::is_none")]
    pub all_tasks: Option<Vec<Task>>,
}

impl DocumentPatch {
    /// A patch replacing only `AllCols`.
    #[must_use]
    pub const fn columns(all_cols: Vec<Column>) -> Self {
        Self {
            all_cols: Some(all_cols),
            all_tasks: None,
        }
    }

    /// A patch replacing only `AllTasks`.
    #[must_use]
    pub const fn tasks(all_tasks: Vec<Task>) -> Self {
        Self {
            all_cols: None,
            all_tasks: Some(all_tasks),
        }
    }

    /// Returns `true` if the patch names no field.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.all_cols.is_none() && self.all_tasks.is_none()
    }

    /// Merges the named fields into `doc`.
    pub fn apply_to(self, doc: &mut BoardDocument) {
        if let Some(cols) = self.all_cols {
            doc.all_cols = cols;
        }
        if let Some(tasks) = self.all_tasks {
            doc.all_tasks = tasks;
        }
    }
}

/// A document together with its identifier, as returned by a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Document identifier.
    pub id: DocumentId,
    /// Document fields.
    pub fields: BoardDocument,
}
