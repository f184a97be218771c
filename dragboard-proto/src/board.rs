//! Board data model: columns, tasks and the board aggregate.
//!
//! Order is positional everywhere. A column's index in [`Board::columns`] is
//! its rank, and [`Board::tasks`] is a single global sequence in which the
//! tasks of each column appear in display order, interleaved with the tasks
//! of other columns.

use serde::{Deserialize, Serialize};

/// Opaque identifier of a column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnId(String);

impl ColumnId {
    /// Wraps an existing identifier string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ColumnId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ColumnId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ColumnId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Opaque identifier of a task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Wraps an existing identifier string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for TaskId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A named group of tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Unique column identifier.
    pub id: ColumnId,
    /// Display title.
    pub title: String,
}

impl Column {
    /// Creates a column with the given id and title.
    pub fn new(id: impl Into<ColumnId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// A content-bearing item that belongs to exactly one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique task identifier.
    pub id: TaskId,
    /// Column this task is displayed in.
    #[serde(rename = "columnId")]
    pub column_id: ColumnId,
    /// Free-form task text.
    pub content: String,
}

impl Task {
    /// Creates a task in `column_id` with the given content.
    pub fn new(
        id: impl Into<TaskId>,
        column_id: impl Into<ColumnId>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            column_id: column_id.into(),
            content: content.into(),
        }
    }
}

/// The aggregate of all columns and tasks for one deployment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    /// Identifier of the remote document mirroring this board.
    pub id: String,
    /// Columns in display order.
    pub columns: Vec<Column>,
    /// Global task sequence.
    pub tasks: Vec<Task>,
}

impl Board {
    /// Creates an empty board bound to `id`.
    pub fn empty(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            columns: Vec::new(),
            tasks: Vec::new(),
        }
    }

    /// Returns the tasks of one column in display order.
    pub fn tasks_in<'a>(&'a self, column_id: &'a ColumnId) -> impl Iterator<Item = &'a Task> + 'a {
        self.tasks.iter().filter(move |t| t.column_id == *column_id)
    }
}
