//! Integration tests for board CRUD through a `BoardSession`.
//!
//! Every operation must be visible locally on return and mirrored to the
//! document store once the session is flushed.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::collections::HashSet;
use std::sync::Arc;

use dragboard::BoardSession;
use dragboard::drag::{DragEvent, DragItem};
use dragboard::ids::SequentialIds;
use dragboard::remote::file::FileDocumentStore;
use dragboard::remote::memory::InMemoryDocumentStore;
use dragboard::sync::{BoardOrigin, SyncOptions};
use dragboard_proto::board::{Column, ColumnId, Task, TaskId};
use dragboard_proto::document::{BoardDocument, DocumentId};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

type Session = BoardSession<InMemoryDocumentStore, SequentialIds>;

async fn open(remote: &InMemoryDocumentStore) -> Session {
    BoardSession::load(
        Arc::new(remote.clone()),
        &SyncOptions::default(),
        SequentialIds::new("id"),
    )
    .await
    .unwrap()
}

/// A store holding `board` with two columns `c1`, `c2` and the given tasks.
fn two_columns(tasks: Vec<Task>) -> InMemoryDocumentStore {
    InMemoryDocumentStore::with_document(
        "notes",
        "board",
        BoardDocument {
            all_cols: vec![Column::new("c1", "Column 1"), Column::new("c2", "Column 2")],
            all_tasks: tasks,
        },
    )
}

fn remote_doc(remote: &InMemoryDocumentStore, session: &Session) -> BoardDocument {
    remote.snapshot("notes", session.board_id()).unwrap()
}

fn task_ids(tasks: &[Task]) -> Vec<&str> {
    tasks.iter().map(|t| t.id.as_str()).collect()
}

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

#[tokio::test]
async fn loads_first_document_as_board() {
    let remote = two_columns(vec![Task::new("t1", "c1", "Task 1")]);
    let session = open(&remote).await;

    assert_eq!(session.origin(), BoardOrigin::Existing);
    assert_eq!(session.board_id(), &DocumentId::new("board"));
    assert_eq!(session.column_ids(), [&ColumnId::new("c1"), &ColumnId::new("c2")]);
    assert_eq!(task_ids(session.tasks()), ["t1"]);
}

#[tokio::test]
async fn empty_collection_bootstraps_on_first_write() {
    let remote = InMemoryDocumentStore::new();
    let mut session = open(&remote).await;
    assert_eq!(session.origin(), BoardOrigin::Fresh);
    assert_eq!(remote.document_count("notes"), 0);

    session.create_column();
    session.flush().await;

    assert_eq!(remote.document_count("notes"), 1);
    let doc = remote_doc(&remote, &session);
    assert_eq!(doc.all_cols.len(), 1);
    assert!(doc.all_tasks.is_empty());
}

#[tokio::test]
async fn dangling_tasks_are_dropped_on_load() {
    let remote = two_columns(vec![
        Task::new("t1", "c1", "Task 1"),
        Task::new("t2", "gone", "Task 2"),
    ]);
    let session = open(&remote).await;
    assert_eq!(task_ids(session.tasks()), ["t1"]);
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_task_numbers_by_total_count() {
    let remote = two_columns(Vec::new());
    let mut session = open(&remote).await;

    session.create_task(&ColumnId::new("c1"));
    session.create_task(&ColumnId::new("c2"));
    let tasks = session.create_task(&ColumnId::new("c1"));

    let contents: Vec<_> = tasks.iter().map(|t| t.content.as_str()).collect();
    assert_eq!(contents, ["Task 1", "Task 2", "Task 3"]);
    assert_eq!(tasks[1].column_id, ColumnId::new("c2"));

    session.flush().await;
    assert_eq!(remote_doc(&remote, &session).all_tasks, session.tasks());
}

#[tokio::test]
async fn ids_stay_unique_across_many_creates() {
    let remote = two_columns(Vec::new());
    let mut session = open(&remote).await;
    for _ in 0..50 {
        session.create_task(&ColumnId::new("c1"));
        session.create_column();
    }
    let task_set: HashSet<_> = session.tasks().iter().map(|t| &t.id).collect();
    let column_set: HashSet<_> = session.columns().iter().map(|c| &c.id).collect();
    assert_eq!(task_set.len(), 50);
    assert_eq!(column_set.len(), 52);
}

#[tokio::test]
async fn delete_column_cascades_locally_and_remotely() {
    let remote = two_columns(vec![
        Task::new("t1", "c1", "Task 1"),
        Task::new("t2", "c2", "Task 2"),
        Task::new("t3", "c1", "Task 3"),
    ]);
    let mut session = open(&remote).await;

    let columns = session.delete_column(&ColumnId::new("c1"));
    assert_eq!(columns, [Column::new("c2", "Column 2")]);
    assert_eq!(task_ids(session.tasks()), ["t2"]);

    session.flush().await;
    let doc = remote_doc(&remote, &session);
    assert_eq!(doc.all_cols, session.columns());
    assert_eq!(doc.all_tasks, session.tasks());
}

#[tokio::test]
async fn rename_column_twice_is_stable() {
    let remote = two_columns(Vec::new());
    let mut session = open(&remote).await;

    let first = session.rename_column(&ColumnId::new("c1"), "Todo").to_vec();
    let second = session.rename_column(&ColumnId::new("c1"), "Todo").to_vec();
    assert_eq!(first, second);

    session.flush().await;
    assert_eq!(remote_doc(&remote, &session).all_cols[0].title, "Todo");
}

#[tokio::test]
async fn rename_and_delete_task() {
    let remote = two_columns(vec![
        Task::new("t1", "c1", "Task 1"),
        Task::new("t2", "c1", "Task 2"),
    ]);
    let mut session = open(&remote).await;

    session.rename_task(&TaskId::new("t2"), "Write tests");
    session.delete_task(&TaskId::new("t1"));
    session.flush().await;

    assert_eq!(session.tasks(), [Task::new("t2", "c1", "Write tests")]);
    assert_eq!(remote_doc(&remote, &session).all_tasks, session.tasks());
}

#[tokio::test]
async fn operations_on_absent_entities_change_nothing() {
    let remote = two_columns(vec![Task::new("t1", "c1", "Task 1")]);
    let mut session = open(&remote).await;
    let before = session.to_board();

    session.rename_column(&ColumnId::new("nope"), "x");
    session.delete_column(&ColumnId::new("nope"));
    session.rename_task(&TaskId::new("nope"), "x");
    session.delete_task(&TaskId::new("nope"));
    session.create_task(&ColumnId::new("nope"));
    session.flush().await;

    assert_eq!(session.to_board(), before);
    let doc = remote_doc(&remote, &session);
    assert_eq!(doc.all_cols, before.columns);
    assert_eq!(doc.all_tasks, before.tasks);
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[tokio::test]
async fn drop_task_on_empty_column_appends() {
    let remote = two_columns(Vec::new());
    let mut session = open(&remote).await;

    let t1 = session.create_task(&ColumnId::new("c1"))[0].id.clone();
    let t2 = session.create_task(&ColumnId::new("c1"))[1].id.clone();

    let active = DragItem::Task(t1.clone());
    session.drag_start(&active);
    let drop = DragEvent::new(active, DragItem::Column(ColumnId::new("c2")));
    session.drag_over(&drop);
    session.drag_end(&drop);
    session.flush().await;

    assert_eq!(session.tasks()[0].id, t2);
    assert_eq!(session.tasks()[1].id, t1);
    assert_eq!(session.tasks()[1].column_id, ColumnId::new("c2"));
    assert_eq!(remote_doc(&remote, &session).all_tasks, session.tasks());
}

#[tokio::test]
async fn delete_column_scenario() {
    let remote = two_columns(vec![
        Task::new("a", "c1", "Task 1"),
        Task::new("b", "c1", "Task 2"),
        Task::new("c", "c2", "Task 3"),
    ]);
    let mut session = open(&remote).await;
    session.delete_column(&ColumnId::new("c1"));

    assert_eq!(session.columns(), [Column::new("c2", "Column 2")]);
    assert_eq!(session.tasks(), [Task::new("c", "c2", "Task 3")]);
}

// ---------------------------------------------------------------------------
// File-backed store
// ---------------------------------------------------------------------------

#[tokio::test]
async fn file_store_survives_restart() {
    let tmp = TempDir::new().unwrap();
    let options = SyncOptions::default();

    let board_id = {
        let remote = Arc::new(FileDocumentStore::new(tmp.path()));
        let mut session = BoardSession::load(remote, &options, SequentialIds::new("s1"))
            .await
            .unwrap();
        session.create_column();
        session.flush().await;
        let column = session.columns()[0].id.clone();
        session.create_task(&column);
        session.rename_column(&column, "Backlog");
        session.flush().await;
        session.board_id().clone()
    };

    let remote = Arc::new(FileDocumentStore::new(tmp.path()));
    let session = BoardSession::load(remote, &options, SequentialIds::new("s2"))
        .await
        .unwrap();
    assert_eq!(session.origin(), BoardOrigin::Existing);
    assert_eq!(session.board_id(), &board_id);
    assert_eq!(session.columns()[0].title, "Backlog");
    assert_eq!(session.tasks().len(), 1);
    assert_eq!(session.tasks()[0].content, "Task 1");
}
