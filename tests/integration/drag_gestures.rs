//! Integration tests for full drag gestures through a `BoardSession`.
//!
//! A gesture is a drag-start, any number of drag-overs, then a drag-end or
//! a cancel. Tests check the live order, the final order and what reached
//! the document store.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;

use dragboard::BoardSession;
use dragboard::drag::{DragEffect, DragEvent, DragItem, DragState};
use dragboard::ids::SequentialIds;
use dragboard::remote::memory::InMemoryDocumentStore;
use dragboard::sync::{SyncMode, SyncOptions};
use dragboard_proto::board::{Column, ColumnId, Task, TaskId};
use dragboard_proto::document::{BoardDocument, DocumentId};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

type Session = BoardSession<InMemoryDocumentStore, SequentialIds>;

fn col(id: &str) -> DragItem {
    DragItem::Column(ColumnId::new(id))
}

fn task(id: &str) -> DragItem {
    DragItem::Task(TaskId::new(id))
}

/// c1: [a1, a2, a3], c2: [b1, b2], c3: [], interleaved globally.
fn seeded_remote() -> InMemoryDocumentStore {
    InMemoryDocumentStore::with_document(
        "notes",
        "board",
        BoardDocument {
            all_cols: vec![
                Column::new("c1", "Column 1"),
                Column::new("c2", "Column 2"),
                Column::new("c3", "Column 3"),
            ],
            all_tasks: vec![
                Task::new("a1", "c1", "Task 1"),
                Task::new("b1", "c2", "Task 2"),
                Task::new("a2", "c1", "Task 3"),
                Task::new("b2", "c2", "Task 4"),
                Task::new("a3", "c1", "Task 5"),
            ],
        },
    )
}

async fn open(remote: &InMemoryDocumentStore, mode: SyncMode) -> Session {
    let options = SyncOptions {
        mode,
        ..SyncOptions::default()
    };
    BoardSession::load(Arc::new(remote.clone()), &options, SequentialIds::new("id"))
        .await
        .unwrap()
}

fn order(session: &Session) -> Vec<&str> {
    session.tasks().iter().map(|t| t.id.as_str()).collect()
}

fn column_order(session: &Session) -> Vec<&str> {
    session.columns().iter().map(|c| c.id.as_str()).collect()
}

fn column_of<'a>(session: &'a Session, id: &str) -> &'a str {
    session
        .tasks()
        .iter()
        .find(|t| t.id.as_str() == id)
        .map(|t| t.column_id.as_str())
        .unwrap()
}

fn remote_doc(remote: &InMemoryDocumentStore) -> BoardDocument {
    remote.snapshot("notes", &DocumentId::new("board")).unwrap()
}

/// Runs start, each over, then end on the last target.
fn gesture(session: &mut Session, active: &DragItem, hovers: &[DragItem]) -> Option<DragEffect> {
    session.drag_start(active);
    for over in hovers {
        session.drag_over(&DragEvent::new(active.clone(), over.clone()));
    }
    let end = hovers.last().map_or_else(
        || DragEvent::without_target(active.clone()),
        |over| DragEvent::new(active.clone(), over.clone()),
    );
    session.drag_end(&end)
}

// ---------------------------------------------------------------------------
// Task gestures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn reorder_within_column() {
    let remote = seeded_remote();
    let mut session = open(&remote, SyncMode::FireAndForget).await;

    let effect = gesture(&mut session, &task("a1"), &[task("a3")]);
    assert_eq!(effect, Some(DragEffect::PersistTasks));
    assert_eq!(order(&session), ["b1", "a2", "b2", "a3", "a1"]);

    session.flush().await;
    assert_eq!(remote_doc(&remote).all_tasks, session.tasks());
}

#[tokio::test]
async fn move_across_columns_before_hovered_task() {
    let remote = seeded_remote();
    let mut session = open(&remote, SyncMode::FireAndForget).await;

    gesture(&mut session, &task("a2"), &[task("b2")]);
    assert_eq!(column_of(&session, "a2"), "c2");
    assert_eq!(order(&session), ["a1", "b1", "a2", "b2", "a3"]);

    // The source column keeps its relative order.
    let c1: Vec<_> = session
        .tasks()
        .iter()
        .filter(|t| t.column_id.as_str() == "c1")
        .map(|t| t.id.as_str())
        .collect();
    assert_eq!(c1, ["a1", "a3"]);

    session.flush().await;
    assert_eq!(remote_doc(&remote).all_tasks, session.tasks());
}

#[tokio::test]
async fn drop_on_empty_column_appends() {
    let remote = seeded_remote();
    let mut session = open(&remote, SyncMode::FireAndForget).await;

    gesture(&mut session, &task("a1"), &[col("c3")]);
    assert_eq!(column_of(&session, "a1"), "c3");
    assert_eq!(order(&session), ["b1", "a2", "b2", "a3", "a1"]);
}

#[tokio::test]
async fn repeated_hovers_converge_with_drop() {
    let remote = seeded_remote();
    let mut session = open(&remote, SyncMode::FireAndForget).await;

    let hovers = vec![task("b1"); 25];
    gesture(&mut session, &task("a3"), &hovers);

    assert_eq!(column_of(&session, "a3"), "c2");
    assert_eq!(order(&session), ["a1", "a3", "b1", "a2", "b2"]);

    session.flush().await;
    assert_eq!(remote_doc(&remote).all_tasks, session.tasks());
}

#[tokio::test]
async fn sweeping_across_tasks_keeps_every_task_once() {
    let remote = seeded_remote();
    let mut session = open(&remote, SyncMode::FireAndForget).await;

    let hovers = [task("b1"), task("a2"), task("b2"), task("a3"), task("b1")];
    gesture(&mut session, &task("a1"), &hovers);

    let mut ids = order(&session);
    ids.sort_unstable();
    assert_eq!(ids, ["a1", "a2", "a3", "b1", "b2"]);
    assert_eq!(column_of(&session, "a1"), "c2");

    session.flush().await;
    assert_eq!(remote_doc(&remote).all_tasks, session.tasks());
}

#[tokio::test]
async fn cancel_keeps_live_order_locally_and_remotely() {
    let remote = seeded_remote();
    let mut session = open(&remote, SyncMode::FireAndForget).await;

    session.drag_start(&task("a1"));
    session.drag_over(&DragEvent::new(task("a1"), task("b2")));
    session.drag_cancel();

    assert_eq!(session.drag_state(), &DragState::Idle);
    assert_eq!(column_of(&session, "a1"), "c2");

    session.flush().await;
    assert_eq!(remote_doc(&remote).all_tasks, session.tasks());
}

#[tokio::test]
async fn drop_without_target_writes_nothing() {
    let remote = seeded_remote();
    let mut session = open(&remote, SyncMode::FireAndForget).await;

    assert_eq!(gesture(&mut session, &task("a1"), &[]), None);
    assert!(session.active_task().is_none());
    assert_eq!(session.in_flight(), 0);
}

// ---------------------------------------------------------------------------
// Column gestures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn column_reorder_is_persisted() {
    let remote = seeded_remote();
    let mut session = open(&remote, SyncMode::FireAndForget).await;

    session.drag_start(&col("c1"));
    assert_eq!(session.active_column().map(|c| c.title.as_str()), Some("Column 1"));

    let effect = session.drag_end(&DragEvent::new(col("c1"), col("c3")));
    assert_eq!(effect, Some(DragEffect::PersistColumns));
    assert_eq!(column_order(&session), ["c2", "c3", "c1"]);
    assert!(session.active_column().is_none());

    session.flush().await;
    assert_eq!(remote_doc(&remote).all_cols, session.columns());
    assert_eq!(remote_doc(&remote).all_tasks.len(), 5);
}

#[tokio::test]
async fn column_hover_does_not_reorder_until_drop() {
    let remote = seeded_remote();
    let mut session = open(&remote, SyncMode::FireAndForget).await;

    session.drag_start(&col("c3"));
    assert_eq!(session.drag_over(&DragEvent::new(col("c3"), col("c1"))), None);
    assert_eq!(column_order(&session), ["c1", "c2", "c3"]);

    session.drag_end(&DragEvent::new(col("c3"), task("a1")));
    assert_eq!(column_order(&session), ["c3", "c1", "c2"]);
}

#[tokio::test]
async fn new_start_replaces_active_session() {
    let remote = seeded_remote();
    let mut session = open(&remote, SyncMode::FireAndForget).await;

    session.drag_start(&col("c1"));
    session.drag_start(&task("b2"));

    assert!(session.active_column().is_none());
    assert_eq!(session.active_task().map(|t| t.id.as_str()), Some("b2"));
}

// ---------------------------------------------------------------------------
// Coalesced persistence
// ---------------------------------------------------------------------------

#[tokio::test]
async fn coalesced_gesture_lands_final_order() {
    let remote = seeded_remote();
    let mut session = open(&remote, SyncMode::Coalesce).await;

    let hovers = [task("b1"), task("b2"), task("a2"), task("a3"), task("b1")];
    gesture(&mut session, &task("a1"), &hovers);
    session.flush().await;

    assert_eq!(remote_doc(&remote).all_tasks, session.tasks());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn coalesced_writes_on_multi_thread_runtime() {
    let remote = seeded_remote();
    let mut session = open(&remote, SyncMode::Coalesce).await;

    for _ in 0..20 {
        gesture(&mut session, &task("a1"), &[task("b2")]);
        gesture(&mut session, &task("a1"), &[task("a3")]);
    }
    session.flush().await;

    assert_eq!(remote_doc(&remote).all_tasks, session.tasks());
}
