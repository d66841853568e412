//! Turn scheduling.
//!
//! Continuations never run inside the call that registered them or the call
//! that settled their source; they are handed to a [`Schedule`]
//! implementation as a [`Task`] and run on a later *turn*. Tasks run in the
//! order they were scheduled.
//!
//! [`TurnQueue`] is the built-in implementation: a deterministic FIFO queue
//! that the owner drives one turn at a time.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;

/// A unit of work scheduled for a later turn.
pub type Task = Box<dyn FnOnce()>;

/// The scheduling collaborator.
///
/// Implementations must run every scheduled task after the call that
/// scheduled it has returned, and in scheduling order relative to each other.
pub trait Schedule {
    /// Queues a task for a later turn.
    fn schedule(&self, task: Task);

    /// Runs the oldest queued task.
    ///
    /// Returns `false` when nothing was queued.
    fn run_next(&self) -> bool;

    /// Returns the number of queued tasks.
    fn queued(&self) -> usize;
}

/// Deterministic FIFO turn queue.
///
/// Tasks scheduled while a turn runs are appended behind everything already
/// queued.
#[derive(Default)]
pub struct TurnQueue {
    queue: RefCell<VecDeque<Task>>,
    executed: Cell<u64>,
}

impl TurnQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of turns executed so far.
    #[must_use]
    pub fn executed(&self) -> u64 {
        self.executed.get()
    }

    /// Returns true if no task is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }
}

impl Schedule for TurnQueue {
    fn schedule(&self, task: Task) {
        self.queue.borrow_mut().push_back(task);
    }

    fn run_next(&self) -> bool {
        // The borrow must end before the task runs: tasks schedule more tasks.
        let task = self.queue.borrow_mut().pop_front();
        match task {
            Some(task) => {
                task();
                self.executed.set(self.executed.get() + 1);
                true
            }
            None => false,
        }
    }

    fn queued(&self) -> usize {
        self.queue.borrow().len()
    }
}

impl fmt::Debug for TurnQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TurnQueue")
            .field("queued", &self.queued())
            .field("executed", &self.executed())
            .finish()
    }
}
