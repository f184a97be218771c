//! Single-slot hand-off between the UI thread and a background writer.

use parking_lot::Mutex;

#[derive(Debug)]
struct SlotState<T> {
    pending: Option<T>,
    writer_running: bool,
}

/// Holds at most one pending value; a newer offer replaces an older one.
///
/// Exactly one writer drains the slot at a time. [`offer`](Self::offer)
/// reports when a new writer has to be started, and [`take`](Self::take)
/// marks the writer finished once the slot is empty, under the same lock so
/// no value is left behind.
#[derive(Debug)]
pub(crate) struct LatestSlot<T> {
    state: Mutex<SlotState<T>>,
}

impl<T> Default for LatestSlot<T> {
    fn default() -> Self {
        Self {
            state: Mutex::new(SlotState {
                pending: None,
                writer_running: false,
            }),
        }
    }
}

impl<T> LatestSlot<T> {
    /// Stores `value`. Returns `true` if the caller must spawn a writer.
    pub(crate) fn offer(&self, value: T) -> bool {
        let mut state = self.state.lock();
        if state.pending.replace(value).is_some() {
            tracing::trace!("pending positional write superseded");
        }
        if state.writer_running {
            false
        } else {
            state.writer_running = true;
            true
        }
    }

    /// Takes the pending value; `None` means the writer must stop.
    pub(crate) fn take(&self) -> Option<T> {
        let mut state = self.state.lock();
        let value = state.pending.take();
        if value.is_none() {
            state.writer_running = false;
        }
        value
    }
}
