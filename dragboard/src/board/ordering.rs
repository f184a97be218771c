//! Pure ordering functions for columns and tasks.
//!
//! Rank is position: reordering is done by moving elements within a
//! sequence, never by editing a rank field. None of these functions can drop
//! or duplicate an element, and invalid instructions return the input as-is.

use dragboard_proto::board::{ColumnId, Task, TaskId};

/// Moves the element at `from` to index `to`, shifting the others.
///
/// Returns `seq` unchanged when `from == to` or either index is out of
/// bounds.
#[must_use]
pub fn move_within<T>(mut seq: Vec<T>, from: usize, to: usize) -> Vec<T> {
    if from == to || from >= seq.len() || to >= seq.len() {
        return seq;
    }
    let item = seq.remove(from);
    seq.insert(to, item);
    seq
}

/// Moves a task into `new_column` and places it in the global sequence.
///
/// With a `neighbor`, the task lands immediately before the neighbor's
/// position after removal; without one (or if the neighbor is not in the
/// sequence) it is appended. Naming the task as its own neighbor is a no-op,
/// as is an unknown `task_id`.
#[must_use]
pub fn reassign_and_position(
    mut tasks: Vec<Task>,
    task_id: &TaskId,
    new_column: &ColumnId,
    neighbor: Option<&TaskId>,
) -> Vec<Task> {
    if neighbor == Some(task_id) {
        return tasks;
    }
    let Some(from) = tasks.iter().position(|t| t.id == *task_id) else {
        return tasks;
    };

    let mut task = tasks.remove(from);
    task.column_id = new_column.clone();

    let at = neighbor
        .and_then(|n| tasks.iter().position(|t| t.id == *n))
        .unwrap_or(tasks.len());
    tasks.insert(at, task);
    tasks
}
