//! Blocking handles for work scheduled on the worker pool.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

/// Why a scheduled task produced no value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskFailed {
    /// The task panicked; carries the panic message when it was a string.
    Panicked(String),
    /// The task was dropped without running.
    Abandoned,
}

impl fmt::Display for TaskFailed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskFailed::Panicked(msg) => write!(f, "task panicked: {}", msg),
            TaskFailed::Abandoned => f.write_str("task was dropped before it ran"),
        }
    }
}

impl std::error::Error for TaskFailed {}

struct Slot<T> {
    result: Mutex<Option<Result<T, TaskFailed>>>,
    ready: Condvar,
}

/// Shared handle to the eventual result of a task.
///
/// Any number of clones may wait; each gets a clone of the result.
pub struct TaskHandle<T> {
    slot: Arc<Slot<T>>,
}

impl<T> Clone for TaskHandle<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T> fmt::Debug for TaskHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle")
            .field("finished", &self.slot.result.lock().is_some())
            .finish()
    }
}

impl<T: Clone> TaskHandle<T> {
    /// A handle with no result yet and the completer that will fill it.
    pub(crate) fn pending() -> (Self, Completer<T>) {
        let slot = Arc::new(Slot {
            result: Mutex::new(None),
            ready: Condvar::new(),
        });
        let completer = Completer {
            slot: Some(Arc::clone(&slot)),
        };
        (Self { slot }, completer)
    }

    /// Block until the task finishes.
    pub fn wait(&self) -> Result<T, TaskFailed> {
        let mut result = self.slot.result.lock();
        loop {
            if let Some(done) = result.as_ref() {
                return done.clone();
            }
            self.slot.ready.wait(&mut result);
        }
    }

    /// The result, if the task has finished.
    pub fn try_get(&self) -> Option<Result<T, TaskFailed>> {
        self.slot.result.lock().clone()
    }

    pub fn is_finished(&self) -> bool {
        self.slot.result.lock().is_some()
    }
}

/// Write side of a [`TaskHandle`]. Dropping it unused marks the task
/// abandoned so waiters never hang on a lost job.
pub(crate) struct Completer<T> {
    slot: Option<Arc<Slot<T>>>,
}

impl<T> Completer<T> {
    pub(crate) fn complete(mut self, result: Result<T, TaskFailed>) {
        if let Some(slot) = self.slot.take() {
            fill(&slot, result);
        }
    }
}

impl<T> Drop for Completer<T> {
    fn drop(&mut self) {
        if let Some(slot) = self.slot.take() {
            fill(&slot, Err(TaskFailed::Abandoned));
        }
    }
}

fn fill<T>(slot: &Slot<T>, result: Result<T, TaskFailed>) {
    let mut guard = slot.result.lock();
    if guard.is_none() {
        *guard = Some(result);
    }
    slot.ready.notify_all();
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
#[path = "tests/task.rs"]
mod tests;
