//! Pointer-drag lifecycle for reordering columns and tasks.
//!
//! A UI layer reports drag-start, drag-over, drag-end and cancel events;
//! the [`DragController`] turns them into reorderings of the
//! [`BoardStore`](crate::board::BoardStore) and tells the caller which
//! sequence, if any, needs to be persisted.

pub mod controller;

use std::fmt;
use std::str::FromStr;

use dragboard_proto::board::{Column, ColumnId, Task, TaskId};

pub use controller::DragController;

/// A draggable or droppable entity, tagged with its declared type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DragItem {
    /// A column header.
    Column(ColumnId),
    /// A task card.
    Task(TaskId),
}

impl DragItem {
    /// Returns the raw identifier regardless of type.
    #[must_use]
    pub fn id_str(&self) -> &str {
        match self {
            Self::Column(id) => id.as_str(),
            Self::Task(id) => id.as_str(),
        }
    }
}

impl fmt::Display for DragItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Column(id) => write!(f, "column:{id}"),
            Self::Task(id) => write!(f, "task:{id}"),
        }
    }
}

/// Error returned when a `kind:id` drag reference cannot be parsed.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseDragItemError {
    /// The string has no `kind:` prefix.
    #[error("expected `column:<id>` or `task:<id>`, got `{0}`")]
    MissingKind(String),
    /// The prefix is not `column` or `task`.
    #[error("unknown drag item kind `{0}`")]
    UnknownKind(String),
    /// The id after the prefix is empty.
    #[error("drag item id cannot be empty")]
    EmptyId,
}

impl FromStr for DragItem {
    type Err = ParseDragItemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, id) = s
            .split_once(':')
            .ok_or_else(|| ParseDragItemError::MissingKind(s.to_string()))?;
        if id.is_empty() {
            return Err(ParseDragItemError::EmptyId);
        }
        match kind {
            "column" => Ok(Self::Column(ColumnId::new(id))),
            "task" => Ok(Self::Task(TaskId::new(id))),
            other => Err(ParseDragItemError::UnknownKind(other.to_string())),
        }
    }
}

/// A drag-over or drag-end notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragEvent {
    /// The entity being dragged.
    pub active: DragItem,
    /// The entity under the pointer, if any.
    pub over: Option<DragItem>,
}

impl DragEvent {
    /// An event with a hover/drop target.
    #[must_use]
    pub const fn new(active: DragItem, over: DragItem) -> Self {
        Self {
            active,
            over: Some(over),
        }
    }

    /// An event with nothing under the pointer.
    #[must_use]
    pub const fn without_target(active: DragItem) -> Self {
        Self { active, over: None }
    }
}

/// Current drag session, holding a snapshot of the dragged entity.
///
/// The snapshot is for drag previews only; ordering decisions always read
/// the live store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DragState {
    /// No drag in progress.
    #[default]
    Idle,
    /// A column is being dragged.
    DraggingColumn(Column),
    /// A task is being dragged.
    DraggingTask(Task),
}

/// Which sequence a drag handler changed and should be written remotely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragEffect {
    /// Persist the full column sequence.
    PersistColumns,
    /// Persist the full task sequence.
    PersistTasks,
}
