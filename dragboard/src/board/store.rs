//! In-memory board state: the single source of truth a renderer reads.
//!
//! Every mutation is synchronous and immediately observable. Operations on
//! an absent entity are logged and skipped rather than reported as errors.

use dragboard_proto::board::{Board, Column, ColumnId, Task, TaskId};

use crate::ids::{IdSource, UuidIds};

/// Owns the canonical columns and global task sequence of one board.
///
/// The store upholds the membership invariant: every task references a
/// column that is present. Deleting a column removes its tasks in the same
/// call, and tasks cannot be created into a missing column.
pub struct BoardStore<I = UuidIds> {
    columns: Vec<Column>,
    tasks: Vec<Task>,
    ids: I,
}

impl<I: IdSource> BoardStore<I> {
    /// Creates an empty store drawing new ids from `ids`.
    pub const fn new(ids: I) -> Self {
        Self {
            columns: Vec::new(),
            tasks: Vec::new(),
            ids,
        }
    }

    /// Creates a store seeded from a loaded board.
    ///
    /// Tasks that reference a column missing from the board are dropped.
    pub fn from_board(board: Board, ids: I) -> Self {
        let Board { columns, tasks, .. } = board;
        let (tasks, dangling): (Vec<Task>, Vec<Task>) = tasks
            .into_iter()
            .partition(|t| columns.iter().any(|c| c.id == t.column_id));
        for task in &dangling {
            tracing::warn!(
                task_id = %task.id,
                column_id = %task.column_id,
                "dropping loaded task that references a missing column"
            );
        }
        Self {
            columns,
            tasks,
            ids,
        }
    }

    /// Columns in display order.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Global task sequence.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Column ids in display order.
    #[must_use]
    pub fn column_ids(&self) -> Vec<&ColumnId> {
        self.columns.iter().map(|c| &c.id).collect()
    }

    /// Looks up a column by id.
    #[must_use]
    pub fn column(&self, id: &ColumnId) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == *id)
    }

    /// Looks up a task by id.
    #[must_use]
    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == *id)
    }

    /// Copies the current state into a [`Board`] bound to `id`.
    #[must_use]
    pub fn to_board(&self, id: &str) -> Board {
        Board {
            id: id.to_string(),
            columns: self.columns.clone(),
            tasks: self.tasks.clone(),
        }
    }

    /// Appends a column titled `Column N`, N being the new column count.
    pub fn create_column(&mut self) -> &[Column] {
        let column = Column {
            id: ColumnId::new(self.ids.new_id()),
            title: format!("Column {}", self.columns.len() + 1),
        };
        tracing::debug!(column_id = %column.id, "column created");
        self.columns.push(column);
        &self.columns
    }

    /// Replaces the title of a column.
    pub fn rename_column(&mut self, id: &ColumnId, title: &str) -> &[Column] {
        match self.columns.iter_mut().find(|c| c.id == *id) {
            Some(column) => column.title = title.to_string(),
            None => tracing::warn!(column_id = %id, "rename skipped: column not found"),
        }
        &self.columns
    }

    /// Removes a column together with every task it holds.
    pub fn delete_column(&mut self, id: &ColumnId) -> &[Column] {
        let before = self.columns.len();
        self.columns.retain(|c| c.id != *id);
        if self.columns.len() == before {
            tracing::warn!(column_id = %id, "delete skipped: column not found");
            return &self.columns;
        }

        let tasks_before = self.tasks.len();
        self.tasks.retain(|t| t.column_id != *id);
        tracing::debug!(
            column_id = %id,
            removed_tasks = tasks_before - self.tasks.len(),
            "column deleted"
        );
        &self.columns
    }

    /// Appends a task titled `Task N` to a column, N being the new task count.
    pub fn create_task(&mut self, column_id: &ColumnId) -> &[Task] {
        if self.column(column_id).is_none() {
            tracing::warn!(column_id = %column_id, "task not created: column not found");
            return &self.tasks;
        }
        let task = Task {
            id: TaskId::new(self.ids.new_id()),
            column_id: column_id.clone(),
            content: format!("Task {}", self.tasks.len() + 1),
        };
        tracing::debug!(task_id = %task.id, column_id = %column_id, "task created");
        self.tasks.push(task);
        &self.tasks
    }

    /// Replaces the content of a task.
    pub fn rename_task(&mut self, id: &TaskId, content: &str) -> &[Task] {
        match self.tasks.iter_mut().find(|t| t.id == *id) {
            Some(task) => task.content = content.to_string(),
            None => tracing::warn!(task_id = %id, "update skipped: task not found"),
        }
        &self.tasks
    }

    /// Removes a single task.
    pub fn delete_task(&mut self, id: &TaskId) -> &[Task] {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != *id);
        if self.tasks.len() == before {
            tracing::warn!(task_id = %id, "delete skipped: task not found");
        }
        &self.tasks
    }

    /// Installs a reordered column sequence.
    pub(crate) fn replace_columns(&mut self, columns: Vec<Column>) {
        self.columns = columns;
    }

    /// Installs a reordered task sequence.
    pub(crate) fn replace_tasks(&mut self, tasks: Vec<Task>) {
        debug_assert!(
            tasks
                .iter()
                .all(|t| self.columns.iter().any(|c| c.id == t.column_id)),
            "task sequence references a missing column"
        );
        self.tasks = tasks;
    }
}
