//! Deferred Continuations
//!
//! The dispatch gate unlocks on "the next free turn" of the host's
//! cooperative scheduler. This module abstracts that primitive so the binder
//! does not depend on a particular event loop.
//!
//! The gate never opens while a sweep on its binding is still running, so
//! a scheduler is free to run an unlock early: the gate parks it until the
//! sweep returns. Three implementations are provided:
//!
//! - [`TokioScheduler`] spawns the task onto a tokio runtime. With a
//!   current-thread runtime (the `#[tokio::test]` default) the task runs once
//!   the currently running task yields. On a multi-thread runtime another
//!   worker may pick it up at once.
//! - [`TurnQueue`] holds tasks until the owner explicitly runs a turn, which
//!   suits hand-written event loops and deterministic tests.
//! - [`InlineScheduler`] runs the task on the spot. The gate then opens as
//!   soon as the sweep returns. Bindings attached outside a tokio runtime
//!   without a scheduler fall back to it.

use std::collections::VecDeque;

use parking_lot::Mutex;
use tokio::runtime::Handle;

/// A unit of deferred work.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Something that can run a task after the current call stack unwinds.
pub trait Scheduler: Send + Sync + 'static {
    /// Queue `task` for a later turn.
    fn defer(&self, task: Task);
}

/// Defers tasks by spawning them on a tokio runtime.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    handle: Handle,
}

impl TokioScheduler {
    /// Schedule onto the given runtime.
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Schedule onto the runtime the caller is running in.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime, like `tokio::spawn`.
    pub fn current() -> Self {
        Self::new(Handle::current())
    }

    /// Like [`current`](Self::current), but returns `None` outside a runtime.
    pub fn try_current() -> Option<Self> {
        Handle::try_current().ok().map(Self::new)
    }
}

impl Scheduler for TokioScheduler {
    fn defer(&self, task: Task) {
        self.handle.spawn(async move { task() });
    }
}

/// Runs every task immediately, on the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineScheduler;

impl Scheduler for InlineScheduler {
    fn defer(&self, task: Task) {
        task();
    }
}

/// A manually driven task queue.
///
/// Deferred tasks accumulate until [`run_turn`](TurnQueue::run_turn) is
/// called. Tasks deferred while a turn runs wait for the following turn.
#[derive(Default)]
pub struct TurnQueue {
    pending: Mutex<VecDeque<Task>>,
}

impl TurnQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tasks waiting for a turn.
    pub fn pending(&self) -> usize {
        self.pending.lock().len()
    }

    /// Run every task queued before this call. Returns how many ran.
    pub fn run_turn(&self) -> usize {
        // Take the batch first so tasks can defer more work without deadlocking.
        let batch = std::mem::take(&mut *self.pending.lock());
        let count = batch.len();
        for task in batch {
            task();
        }
        count
    }

    /// Run turns until nothing is left. Returns the total number of tasks run.
    pub fn run_until_idle(&self) -> usize {
        let mut total = 0;
        loop {
            let ran = self.run_turn();
            if ran == 0 {
                return total;
            }
            total += ran;
        }
    }
}

impl Scheduler for TurnQueue {
    fn defer(&self, task: Task) {
        self.pending.lock().push_back(task);
    }
}

impl std::fmt::Debug for TurnQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TurnQueue")
            .field("pending", &self.pending())
            .finish()
    }
}
