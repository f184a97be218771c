//! Board session: the explicit state container a UI drives.
//!
//! A [`BoardSession`] owns the [`BoardStore`], the [`DragController`] and the
//! [`Synchronizer`]. Every method applies the local change first, so it is
//! observable on return, and then hands the matching remote write to the
//! synchronizer without waiting for it.

use std::sync::Arc;

use dragboard_proto::board::{Board, Column, ColumnId, Task, TaskId};
use dragboard_proto::document::DocumentId;

use crate::board::BoardStore;
use crate::drag::{DragController, DragEffect, DragEvent, DragItem, DragState};
use crate::ids::{IdSource, UuidIds};
use crate::remote::{DocumentStore, StoreError};
use crate::sync::{BoardOrigin, LoadedBoard, SyncOptions, Synchronizer, load_board};

/// Local board state plus its remote mirror.
pub struct BoardSession<S, I = UuidIds> {
    store: BoardStore<I>,
    drag: DragController,
    sync: Synchronizer<S>,
    origin: BoardOrigin,
}

impl<S, I> BoardSession<S, I>
where
    S: DocumentStore + 'static,
    I: IdSource,
{
    /// Loads the board from `remote` and binds the session to its id.
    ///
    /// # Errors
    ///
    /// Returns the store error if the board cannot be read.
    pub async fn load(
        remote: Arc<S>,
        options: &SyncOptions,
        mut ids: I,
    ) -> Result<Self, StoreError> {
        let loaded =
            load_board(&*remote, &options.collection, options.bootstrap, &mut ids).await?;
        Ok(Self::from_loaded(remote, options, loaded, ids))
    }

    /// Like [`load`](Self::load), but a failed load is logged and the
    /// session starts from an empty board under a fresh id.
    pub async fn load_or_empty(remote: Arc<S>, options: &SyncOptions, mut ids: I) -> Self {
        match load_board(&*remote, &options.collection, options.bootstrap, &mut ids).await {
            Ok(loaded) => Self::from_loaded(remote, options, loaded, ids),
            Err(e) => {
                tracing::error!(
                    collection = %options.collection,
                    error = %e,
                    "failed to load board; starting empty"
                );
                let loaded = LoadedBoard {
                    board: Board::empty(ids.new_id()),
                    origin: BoardOrigin::Fresh,
                };
                Self::from_loaded(remote, options, loaded, ids)
            }
        }
    }

    /// Builds a session around an already loaded board.
    pub fn from_loaded(
        remote: Arc<S>,
        options: &SyncOptions,
        loaded: LoadedBoard,
        ids: I,
    ) -> Self {
        let LoadedBoard { board, origin } = loaded;
        let board_id = DocumentId::new(board.id.clone());
        Self {
            store: BoardStore::from_board(board, ids),
            drag: DragController::new(),
            sync: Synchronizer::new(remote, options.collection.clone(), board_id, options.mode),
            origin,
        }
    }

    // -----------------------------------------------------------------------
    // Observables
    // -----------------------------------------------------------------------

    /// Columns in display order.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        self.store.columns()
    }

    /// Global task sequence.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        self.store.tasks()
    }

    /// Column ids in display order, for sortable containers.
    #[must_use]
    pub fn column_ids(&self) -> Vec<&ColumnId> {
        self.store.column_ids()
    }

    /// Snapshot of the column being dragged.
    #[must_use]
    pub const fn active_column(&self) -> Option<&Column> {
        self.drag.active_column()
    }

    /// Snapshot of the task being dragged.
    #[must_use]
    pub const fn active_task(&self) -> Option<&Task> {
        self.drag.active_task()
    }

    /// Current drag session state.
    #[must_use]
    pub const fn drag_state(&self) -> &DragState {
        self.drag.state()
    }

    /// Id of the board document.
    #[must_use]
    pub fn board_id(&self) -> &DocumentId {
        self.sync.board_id()
    }

    /// Whether the board was loaded or freshly bootstrapped.
    #[must_use]
    pub const fn origin(&self) -> BoardOrigin {
        self.origin
    }

    /// The local board as a value.
    #[must_use]
    pub fn to_board(&self) -> Board {
        self.store.to_board(self.board_id().as_str())
    }

    /// The synchronizer mirroring this session.
    #[must_use]
    pub const fn synchronizer(&self) -> &Synchronizer<S> {
        &self.sync
    }

    // -----------------------------------------------------------------------
    // CRUD
    // -----------------------------------------------------------------------

    /// Appends a new column named `Column N`.
    pub fn create_column(&mut self) -> &[Column] {
        let before = self.store.columns().len();
        self.store.create_column();
        if self.store.columns().len() > before
            && let Some(column) = self.store.columns().last()
        {
            self.sync.append_column_remote(column.clone());
        }
        self.store.columns()
    }

    /// Renames a column.
    pub fn rename_column(&mut self, id: &ColumnId, title: &str) -> &[Column] {
        self.store.rename_column(id, title);
        self.sync
            .update_column_title_remote(id.clone(), title.to_string());
        self.store.columns()
    }

    /// Deletes a column together with its tasks.
    pub fn delete_column(&mut self, id: &ColumnId) -> &[Column] {
        self.store.delete_column(id);
        self.sync.remove_column_remote(id.clone());
        self.store.columns()
    }

    /// Appends a new task named `Task N` to `column_id`.
    ///
    /// Nothing happens if the column does not exist.
    pub fn create_task(&mut self, column_id: &ColumnId) -> &[Task] {
        let before = self.store.tasks().len();
        self.store.create_task(column_id);
        if self.store.tasks().len() > before
            && let Some(task) = self.store.tasks().last()
        {
            self.sync.append_task_remote(task.clone());
        }
        self.store.tasks()
    }

    /// Replaces a task's content.
    pub fn rename_task(&mut self, id: &TaskId, content: &str) -> &[Task] {
        self.store.rename_task(id, content);
        self.sync
            .update_task_content_remote(id.clone(), content.to_string());
        self.store.tasks()
    }

    /// Deletes a task.
    pub fn delete_task(&mut self, id: &TaskId) -> &[Task] {
        self.store.delete_task(id);
        self.sync.remove_task_remote(id.clone());
        self.store.tasks()
    }

    // -----------------------------------------------------------------------
    // Drag lifecycle
    // -----------------------------------------------------------------------

    /// Begins dragging `active`.
    pub fn drag_start(&mut self, active: &DragItem) {
        self.drag.start(&self.store, active);
    }

    /// Applies a drag-over event, persisting any live reorder.
    pub fn drag_over(&mut self, event: &DragEvent) -> Option<DragEffect> {
        let effect = self.drag.over(&mut self.store, event);
        self.persist(effect);
        effect
    }

    /// Applies the drop that ends the drag session.
    pub fn drag_end(&mut self, event: &DragEvent) -> Option<DragEffect> {
        let effect = self.drag.end(&mut self.store, event);
        self.persist(effect);
        effect
    }

    /// Abandons the drag session without rolling back live reorders.
    pub fn drag_cancel(&mut self) {
        self.drag.cancel();
    }

    // -----------------------------------------------------------------------
    // Remote writes
    // -----------------------------------------------------------------------

    /// Waits for all remote writes issued so far.
    pub async fn flush(&mut self) {
        self.sync.flush().await;
    }

    /// Number of remote writes not yet reaped.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.sync.in_flight()
    }

    fn persist(&mut self, effect: Option<DragEffect>) {
        match effect {
            Some(DragEffect::PersistColumns) => {
                self.sync.persist_columns(self.store.columns().to_vec());
            }
            Some(DragEffect::PersistTasks) => {
                self.sync.persist_tasks(self.store.tasks().to_vec());
            }
            None => {}
        }
    }
}
