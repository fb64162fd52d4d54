//! In-memory store for tests and demos.
//!
//! [`MemoryStore`] is a minimal reducer-driven store satisfying the
//! [`Store`] contract. It is not meant to replace an application store.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::bind::{Listener, Store};

type Reducer<S, A> = Box<dyn Fn(&S, &A) -> S + Send + Sync>;
type SharedListener = Arc<dyn Fn() + Send + Sync>;

/// A loosely typed action: `{ "type", "payload", "meta"? }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub payload: Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

impl Action {
    /// Create an action without metadata.
    pub fn new(kind: impl Into<String>, payload: Value) -> Self {
        Self {
            kind: kind.into(),
            payload,
            meta: None,
        }
    }

    /// Attach metadata.
    pub fn with_meta(mut self, meta: Value) -> Self {
        self.meta = Some(meta);
        self
    }
}

/// A reducer-driven store keeping its state in memory.
pub struct MemoryStore<S, A> {
    state: RwLock<S>,
    reducer: Reducer<S, A>,
    listeners: RwLock<Vec<SharedListener>>,
    dispatches: AtomicU64,
}

impl<S, A> MemoryStore<S, A>
where
    S: Clone + Send + Sync + 'static,
    A: Send + 'static,
{
    /// Create a store with an initial state and a reducer.
    pub fn new<R>(initial: S, reducer: R) -> Self
    where
        R: Fn(&S, &A) -> S + Send + Sync + 'static,
    {
        Self {
            state: RwLock::new(initial),
            reducer: Box::new(reducer),
            listeners: RwLock::new(Vec::new()),
            dispatches: AtomicU64::new(0),
        }
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }

    /// Number of actions dispatched so far.
    pub fn dispatch_count(&self) -> u64 {
        self.dispatches.load(Ordering::SeqCst)
    }
}

impl<S, A> Store for MemoryStore<S, A>
where
    S: Clone + Send + Sync + 'static,
    A: Send + 'static,
{
    type State = S;
    type Action = A;

    fn state(&self) -> S {
        self.state.read().clone()
    }

    fn subscribe(&self, listener: Listener) {
        self.listeners.write().push(Arc::from(listener));
    }

    fn dispatch(&self, action: A) {
        {
            let mut state = self.state.write();
            let next = (self.reducer)(&*state, &action);
            *state = next;
        }
        self.dispatches.fetch_add(1, Ordering::SeqCst);

        // Snapshot so listeners may subscribe or dispatch while we iterate.
        let listeners: Vec<SharedListener> = self.listeners.read().clone();
        for listener in listeners {
            listener();
        }
    }
}

impl<S: fmt::Debug, A> fmt::Debug for MemoryStore<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStore")
            .field("state", &*self.state.read())
            .field("listeners", &self.listeners.read().len())
            .field("dispatches", &self.dispatches.load(Ordering::SeqCst))
            .finish()
    }
}
