//! Drag session state machine.
//!
//! Transitions: `start` enters a dragging state, `end` and `cancel` always
//! return to idle. Drag-over events reorder tasks live while the gesture is
//! in progress; drag-end commits the final column assignment. Nothing is
//! rolled back when a session is cancelled.

use dragboard_proto::board::{Column, ColumnId, Task, TaskId};

use super::{DragEffect, DragEvent, DragItem, DragState};
use crate::board::{BoardStore, move_within, reassign_and_position};
use crate::ids::IdSource;

/// Interprets drag lifecycle events against a [`BoardStore`].
///
/// At most one session is active. The controller never performs I/O: each
/// handler returns the [`DragEffect`] the caller should persist.
#[derive(Debug, Default)]
pub struct DragController {
    state: DragState,
    /// Hover target of the last applied drag-over in this session.
    last_over: Option<DragItem>,
}

impl DragController {
    /// Creates an idle controller.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current session state.
    #[must_use]
    pub const fn state(&self) -> &DragState {
        &self.state
    }

    /// Returns `true` while a drag is in progress.
    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        !matches!(self.state, DragState::Idle)
    }

    /// Snapshot of the column being dragged, if any.
    #[must_use]
    pub const fn active_column(&self) -> Option<&Column> {
        match &self.state {
            DragState::DraggingColumn(column) => Some(column),
            _ => None,
        }
    }

    /// Snapshot of the task being dragged, if any.
    #[must_use]
    pub const fn active_task(&self) -> Option<&Task> {
        match &self.state {
            DragState::DraggingTask(task) => Some(task),
            _ => None,
        }
    }

    /// Begins a drag session for `active`.
    ///
    /// A session already in progress is replaced. If the entity is not on
    /// the board the controller stays idle.
    pub fn start<I: IdSource>(&mut self, store: &BoardStore<I>, active: &DragItem) {
        if self.is_dragging() {
            tracing::warn!(item = %active, "drag started while another drag was active");
        }
        self.last_over = None;

        let next = match active {
            DragItem::Column(id) => store.column(id).cloned().map(DragState::DraggingColumn),
            DragItem::Task(id) => store.task(id).cloned().map(DragState::DraggingTask),
        };
        if let Some(state) = next {
            tracing::debug!(item = %active, "drag started");
            self.state = state;
        } else {
            tracing::warn!(item = %active, "drag start ignored: entity not found");
            self.state = DragState::Idle;
        }
    }

    /// Handles the pointer moving over another entity.
    ///
    /// Only task-over-task hovers reorder. Within a column the dragged task
    /// takes the hovered task's index; across columns it joins the hovered
    /// task's column immediately before it. A hover that repeats the
    /// previous hover target changes nothing; leaving and re-entering a
    /// task applies again. Ignored while idle.
    pub fn over<I: IdSource>(
        &mut self,
        store: &mut BoardStore<I>,
        event: &DragEvent,
    ) -> Option<DragEffect> {
        if !self.is_dragging() {
            tracing::debug!(item = %event.active, "drag-over ignored: no active drag");
            return None;
        }
        let repeated = self.last_over == event.over;
        self.last_over.clone_from(&event.over);

        let (DragItem::Task(active_id), Some(DragItem::Task(over_id))) =
            (&event.active, &event.over)
        else {
            return None;
        };
        if active_id == over_id || repeated {
            return None;
        }

        let tasks = store.tasks();
        let from = tasks.iter().position(|t| t.id == *active_id)?;
        let to = tasks.iter().position(|t| t.id == *over_id)?;

        let reordered = if tasks[from].column_id == tasks[to].column_id {
            move_within(tasks.to_vec(), from, to)
        } else {
            let target = tasks[to].column_id.clone();
            reassign_and_position(tasks.to_vec(), active_id, &target, Some(over_id))
        };

        if reordered.as_slice() == store.tasks() {
            return None;
        }
        tracing::debug!(task_id = %active_id, over = %over_id, "task reordered during drag");
        store.replace_tasks(reordered);
        Some(DragEffect::PersistTasks)
    }

    /// Handles the drop that ends a session.
    ///
    /// Always returns to idle. Returns `None` when there is no drop target,
    /// the target is the dragged entity itself, or the target cannot be
    /// resolved on the board.
    pub fn end<I: IdSource>(
        &mut self,
        store: &mut BoardStore<I>,
        event: &DragEvent,
    ) -> Option<DragEffect> {
        self.state = DragState::Idle;
        self.last_over = None;

        let over = event.over.as_ref()?;
        if event.active.id_str() == over.id_str() {
            return None;
        }

        match &event.active {
            DragItem::Column(active_id) => drop_column(store, active_id, over),
            DragItem::Task(active_id) => drop_task(store, active_id, over),
        }
    }

    /// Abandons the current session, keeping whatever order was applied.
    pub fn cancel(&mut self) {
        if self.is_dragging() {
            tracing::debug!("drag cancelled");
        }
        self.state = DragState::Idle;
        self.last_over = None;
    }
}

/// Resolves the column a drop target belongs to.
fn target_column<I: IdSource>(store: &BoardStore<I>, over: &DragItem) -> Option<ColumnId> {
    let resolved = match over {
        DragItem::Column(id) => store.column(id).map(|c| c.id.clone()),
        DragItem::Task(id) => store.task(id).map(|t| t.column_id.clone()),
    };
    if resolved.is_none() {
        tracing::debug!(over = %over, "drop target not found on board");
    }
    resolved
}

fn drop_column<I: IdSource>(
    store: &mut BoardStore<I>,
    active_id: &ColumnId,
    over: &DragItem,
) -> Option<DragEffect> {
    let target = target_column(store, over)?;
    if target == *active_id {
        return None;
    }
    let columns = store.columns();
    let from = columns.iter().position(|c| c.id == *active_id)?;
    let to = columns.iter().position(|c| c.id == target)?;

    let reordered = move_within(columns.to_vec(), from, to);
    tracing::debug!(column_id = %active_id, from, to, "column dropped");
    store.replace_columns(reordered);
    Some(DragEffect::PersistColumns)
}

fn drop_task<I: IdSource>(
    store: &mut BoardStore<I>,
    active_id: &TaskId,
    over: &DragItem,
) -> Option<DragEffect> {
    let target = target_column(store, over)?;
    let current = store.task(active_id)?.column_id.clone();

    if current != target {
        let neighbor = match over {
            DragItem::Task(id) => Some(id),
            DragItem::Column(_) => None,
        };
        tracing::debug!(task_id = %active_id, column_id = %target, "task moved to column");
        let moved = reassign_and_position(store.tasks().to_vec(), active_id, &target, neighbor);
        store.replace_tasks(moved);
    }
    Some(DragEffect::PersistTasks)
}
