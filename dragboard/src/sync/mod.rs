//! Persistence synchronizer.
//!
//! Mirrors local board mutations to a [`DocumentStore`] without blocking the
//! caller. Every remote operation is spawned onto the tokio runtime and
//! tracked in a [`JoinSet`]; failures are logged and never reach the caller,
//! so local state is authoritative for the session. Calls are independent
//! and the store applies them in whatever order they land.
//!
//! Structural edits (append, remove, rename) read the current remote
//! document and write back a field derived from that snapshot, not from
//! local state. Positional writes (`persist_*`) overwrite a whole field with
//! the local sequence.

mod slot;

use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;

use dragboard_proto::board::{Board, Column, ColumnId, Task, TaskId};
use dragboard_proto::document::{BoardDocument, DEFAULT_COLLECTION, DocumentId, DocumentPatch};
use serde::Deserialize;
use tokio::task::JoinSet;

use self::slot::LatestSlot;
use crate::ids::IdSource;
use crate::remote::{DocumentStore, StoreError};

/// Errors raised by a remote write. Logged, never surfaced to the caller.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The store rejected or failed the call.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// An edit needed the board document but it does not exist yet.
    #[error("board document {0} does not exist")]
    MissingDocument(DocumentId),
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// How positional writes are dispatched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncMode {
    /// Every write is spawned independently; the last one to land wins.
    #[default]
    FireAndForget,
    /// At most one positional write per field is in flight. Newer writes
    /// replace a pending one, so the latest local sequence always lands last.
    Coalesce,
}

/// What to do when the collection holds no board document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BootstrapPolicy {
    /// Pick a fresh id locally; the document appears on the first write.
    #[default]
    Lazy,
    /// Create an empty document up front and bind to its id.
    Eager,
}

/// Error returned when parsing a [`SyncMode`] or [`BootstrapPolicy`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseOptionError {
    kind: &'static str,
    value: String,
}

impl FromStr for SyncMode {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fire-and-forget" => Ok(Self::FireAndForget),
            "coalesce" => Ok(Self::Coalesce),
            other => Err(ParseOptionError {
                kind: "sync mode",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for SyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::FireAndForget => "fire-and-forget",
            Self::Coalesce => "coalesce",
        })
    }
}

impl FromStr for BootstrapPolicy {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lazy" => Ok(Self::Lazy),
            "eager" => Ok(Self::Eager),
            other => Err(ParseOptionError {
                kind: "bootstrap policy",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for BootstrapPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Lazy => "lazy",
            Self::Eager => "eager",
        })
    }
}

/// Settings shared by loading and synchronization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    /// Collection holding the board document.
    pub collection: String,
    /// Dispatch strategy for positional writes.
    pub mode: SyncMode,
    /// Behavior when no board document exists.
    pub bootstrap: BootstrapPolicy,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            collection: DEFAULT_COLLECTION.to_string(),
            mode: SyncMode::default(),
            bootstrap: BootstrapPolicy::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

/// Whether the loaded board came from an existing document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardOrigin {
    /// The first document of the collection was loaded.
    Existing,
    /// The collection was empty and a fresh board id was chosen.
    Fresh,
}

/// Result of [`load_board`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedBoard {
    /// The board, bound to its document id.
    pub board: Board,
    /// Where the board came from.
    pub origin: BoardOrigin,
}

/// Loads the board from the first document of `collection`.
///
/// An empty collection yields an empty board whose id comes from `ids`
/// ([`BootstrapPolicy::Lazy`]) or from a newly created empty document
/// ([`BootstrapPolicy::Eager`]).
///
/// # Errors
///
/// Returns the store error if listing the collection (or creating the
/// document under the eager policy) fails.
pub async fn load_board<S, I>(
    remote: &S,
    collection: &str,
    policy: BootstrapPolicy,
    ids: &mut I,
) -> Result<LoadedBoard, StoreError>
where
    S: DocumentStore,
    I: IdSource,
{
    let documents = remote.list_documents(collection).await?;
    if documents.len() > 1 {
        tracing::debug!(
            collection,
            count = documents.len(),
            "collection holds several documents; using the first"
        );
    }
    if let Some(first) = documents.into_iter().next() {
        let board = first.fields.into_board(first.id.as_str());
        tracing::info!(
            collection,
            board_id = %board.id,
            columns = board.columns.len(),
            tasks = board.tasks.len(),
            "board loaded"
        );
        return Ok(LoadedBoard {
            board,
            origin: BoardOrigin::Existing,
        });
    }

    let id = match policy {
        BootstrapPolicy::Lazy => DocumentId::new(ids.new_id()),
        BootstrapPolicy::Eager => {
            remote
                .create_document(collection, BoardDocument::default())
                .await?
        }
    };
    tracing::info!(collection, board_id = %id, %policy, "no board document; starting empty");
    Ok(LoadedBoard {
        board: Board::empty(id.as_str()),
        origin: BoardOrigin::Fresh,
    })
}

// ---------------------------------------------------------------------------
// Synchronizer
// ---------------------------------------------------------------------------

/// Address of the board document.
#[derive(Debug)]
struct Target {
    collection: String,
    board_id: DocumentId,
}

/// Issues remote writes for local mutations.
///
/// Must be used from within a tokio runtime. Dropping the synchronizer
/// detaches writes still in flight; call [`flush`](Self::flush) first to
/// wait for them.
pub struct Synchronizer<S> {
    remote: Arc<S>,
    target: Arc<Target>,
    mode: SyncMode,
    in_flight: JoinSet<()>,
    pending_columns: Arc<LatestSlot<Vec<Column>>>,
    pending_tasks: Arc<LatestSlot<Vec<Task>>>,
}

impl<S> fmt::Debug for Synchronizer<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Synchronizer")
            .field("collection", &self.target.collection)
            .field("board_id", &self.target.board_id)
            .field("mode", &self.mode)
            .field("in_flight", &self.in_flight.len())
            .finish_non_exhaustive()
    }
}

impl<S: DocumentStore + 'static> Synchronizer<S> {
    /// Creates a synchronizer writing to `board_id` in `collection`.
    pub fn new(
        remote: Arc<S>,
        collection: impl Into<String>,
        board_id: DocumentId,
        mode: SyncMode,
    ) -> Self {
        Self {
            remote,
            target: Arc::new(Target {
                collection: collection.into(),
                board_id,
            }),
            mode,
            in_flight: JoinSet::new(),
            pending_columns: Arc::default(),
            pending_tasks: Arc::default(),
        }
    }

    /// Id of the board document written to.
    #[must_use]
    pub fn board_id(&self) -> &DocumentId {
        &self.target.board_id
    }

    /// Collection the board document lives in.
    #[must_use]
    pub fn collection(&self) -> &str {
        &self.target.collection
    }

    /// Active dispatch strategy.
    #[must_use]
    pub const fn mode(&self) -> SyncMode {
        self.mode
    }

    /// Number of spawned writes not yet reaped.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Waits for every spawned write to finish.
    pub async fn flush(&mut self) {
        while let Some(joined) = self.in_flight.join_next().await {
            if let Err(e) = joined {
                tracing::error!(error = %e, "remote write task did not complete");
            }
        }
    }

    /// Overwrites `AllCols` with the local column sequence.
    pub fn persist_columns(&mut self, columns: Vec<Column>) {
        match self.mode {
            SyncMode::FireAndForget => {
                self.spawn_write("persist_columns", true, move |_| {
                    DocumentPatch::columns(columns)
                });
            }
            SyncMode::Coalesce => {
                let slot = Arc::clone(&self.pending_columns);
                self.spawn_coalesced("persist_columns", slot, columns, DocumentPatch::columns);
            }
        }
    }

    /// Overwrites `AllTasks` with the local task sequence.
    pub fn persist_tasks(&mut self, tasks: Vec<Task>) {
        match self.mode {
            SyncMode::FireAndForget => {
                self.spawn_write("persist_tasks", true, move |_| DocumentPatch::tasks(tasks));
            }
            SyncMode::Coalesce => {
                let slot = Arc::clone(&self.pending_tasks);
                self.spawn_coalesced("persist_tasks", slot, tasks, DocumentPatch::tasks);
            }
        }
    }

    /// Appends `column` to the remote `AllCols`.
    pub fn append_column_remote(&mut self, column: Column) {
        self.spawn_write("append_column", true, move |doc| {
            let mut cols = doc.all_cols;
            cols.push(column);
            DocumentPatch::columns(cols)
        });
    }

    /// Appends `task` to the remote `AllTasks`.
    pub fn append_task_remote(&mut self, task: Task) {
        self.spawn_write("append_task", true, move |doc| {
            let mut tasks = doc.all_tasks;
            tasks.push(task);
            DocumentPatch::tasks(tasks)
        });
    }

    /// Removes a column and its tasks from the remote document.
    pub fn remove_column_remote(&mut self, id: ColumnId) {
        self.spawn_write("remove_column", false, move |doc| DocumentPatch {
            all_cols: Some(doc.all_cols.into_iter().filter(|c| c.id != id).collect()),
            all_tasks: Some(
                doc.all_tasks
                    .into_iter()
                    .filter(|t| t.column_id != id)
                    .collect(),
            ),
        });
    }

    /// Removes a task from the remote `AllTasks`.
    pub fn remove_task_remote(&mut self, id: TaskId) {
        self.spawn_write("remove_task", false, move |doc| {
            DocumentPatch::tasks(doc.all_tasks.into_iter().filter(|t| t.id != id).collect())
        });
    }

    /// Sets a column's title in the remote `AllCols`.
    pub fn update_column_title_remote(&mut self, id: ColumnId, title: String) {
        self.spawn_write("update_column_title", false, move |doc| {
            let cols = doc
                .all_cols
                .into_iter()
                .map(|c| if c.id == id { Column { title: title.clone(), ..c } } else { c })
                .collect();
            DocumentPatch::columns(cols)
        });
    }

    /// Sets a task's content in the remote `AllTasks`.
    pub fn update_task_content_remote(&mut self, id: TaskId, content: String) {
        self.spawn_write("update_task_content", false, move |doc| {
            let tasks = doc
                .all_tasks
                .into_iter()
                .map(|t| if t.id == id { Task { content: content.clone(), ..t } } else { t })
                .collect();
            DocumentPatch::tasks(tasks)
        });
    }

    /// Spawns a read-modify-write of the board document.
    fn spawn_write<F>(&mut self, op: &'static str, create_if_absent: bool, edit: F)
    where
        F: FnOnce(BoardDocument) -> DocumentPatch + Send + 'static,
    {
        let remote = Arc::clone(&self.remote);
        let target = Arc::clone(&self.target);
        self.spawn(op, async move {
            read_modify_write(&*remote, &target, create_if_absent, edit).await
        });
    }

    /// Hands `value` to the field's slot, starting a writer if none runs.
    fn spawn_coalesced<T>(
        &mut self,
        op: &'static str,
        slot: Arc<LatestSlot<T>>,
        value: T,
        to_patch: fn(T) -> DocumentPatch,
    ) where
        T: Send + 'static,
    {
        if !slot.offer(value) {
            return;
        }
        let remote = Arc::clone(&self.remote);
        let target = Arc::clone(&self.target);
        self.spawn(op, async move {
            while let Some(value) = slot.take() {
                let patch = to_patch(value);
                if let Err(e) = read_modify_write(&*remote, &target, true, |_| patch).await {
                    tracing::warn!(op, error = %e, "remote write failed; local state kept");
                }
            }
            Ok(())
        });
    }

    fn spawn<F>(&mut self, op: &'static str, write: F)
    where
        F: Future<Output = Result<(), SyncError>> + Send + 'static,
    {
        while let Some(joined) = self.in_flight.try_join_next() {
            if let Err(e) = joined {
                tracing::error!(error = %e, "remote write task did not complete");
            }
        }
        tracing::trace!(op, board_id = %self.target.board_id, "remote write spawned");
        self.in_flight.spawn(async move {
            if let Err(e) = write.await {
                tracing::warn!(op, error = %e, "remote write failed; local state kept");
            }
        });
    }
}

impl<S> Drop for Synchronizer<S> {
    fn drop(&mut self) {
        if !self.in_flight.is_empty() {
            tracing::debug!(
                count = self.in_flight.len(),
                "detaching remote writes still in flight"
            );
        }
        self.in_flight.detach_all();
    }
}

/// Reads the board document, derives a patch from it and writes it back.
///
/// An absent document is created from the patch alone when
/// `create_if_absent` is set, otherwise the edit is abandoned.
async fn read_modify_write<S, F>(
    remote: &S,
    target: &Target,
    create_if_absent: bool,
    edit: F,
) -> Result<(), SyncError>
where
    S: DocumentStore,
    F: FnOnce(BoardDocument) -> DocumentPatch + Send,
{
    let (collection, id) = (target.collection.as_str(), &target.board_id);
    match remote.get_document(collection, id).await? {
        Some(doc) => remote.update_document(collection, id, edit(doc)).await?,
        None if create_if_absent => {
            let mut doc = BoardDocument::default();
            edit(BoardDocument::default()).apply_to(&mut doc);
            remote.set_document(collection, id, doc).await?;
        }
        None => return Err(SyncError::MissingDocument(id.clone())),
    }
    Ok(())
}
