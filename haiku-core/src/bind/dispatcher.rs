//! Guarded dispatch handles.

use std::fmt;
use std::sync::Arc;

use super::gate::DispatchGate;
use super::store::Store;
use crate::error::Result;

type Sink<A> = Arc<dyn Fn(A) + Send + Sync>;

/// A dispatch function guarded by a binding's gate.
///
/// Handed to `map_dispatch` on every sweep. Cloning is cheap, and clones may
/// be moved into asynchronous tasks; they all share the binding's gate.
///
/// The gate is checked once, right before the action is forwarded. A
/// dispatch made while a sweep of this binding runs, on any thread, is
/// refused. A sweep that another thread starts between the check and the
/// forward does not stop the action: it reaches the store as if it had been
/// dispatched just before that sweep, and the store orders the two.
pub struct Dispatcher<A> {
    sink: Sink<A>,
    gate: Arc<DispatchGate>,
}

impl<A: Send + 'static> Dispatcher<A> {
    pub(crate) fn new<S>(store: Arc<S>, gate: Arc<DispatchGate>) -> Self
    where
        S: Store<Action = A>,
    {
        Self {
            sink: Arc::new(move |action| store.dispatch(action)),
            gate,
        }
    }
}

impl<A> Dispatcher<A> {
    /// Forward `action` to the store.
    ///
    /// Fails with [`Error::SynchronousDispatchForbidden`](crate::Error::SynchronousDispatchForbidden)
    /// while the sweep that produced this dispatcher (or a later one) is
    /// running or has not reached its unlock turn. The action is dropped in that case; nothing is queued.
    pub fn dispatch(&self, action: A) -> Result<()> {
        if let Err(err) = self.gate.check() {
            tracing::debug!(cycle = self.gate.cycle(), "refused synchronous dispatch");
            return Err(err);
        }
        (self.sink)(action);
        Ok(())
    }

    /// Whether a dispatch right now would be refused.
    pub fn is_locked(&self) -> bool {
        !self.gate.is_open()
    }
}

impl<A> Clone for Dispatcher<A> {
    fn clone(&self) -> Self {
        Self {
            sink: Arc::clone(&self.sink),
            gate: Arc::clone(&self.gate),
        }
    }
}

impl<A> fmt::Debug for Dispatcher<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("gate", &self.gate.state())
            .field("cycle", &self.gate.cycle())
            .finish()
    }
}
