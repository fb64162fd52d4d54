//! Binding handles.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use super::gate::{DispatchGate, GateState};

/// Unique identifier for an attached binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingId(u64);

impl BindingId {
    /// Generate a new unique binding ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for BindingId {
    fn default() -> Self {
        Self::new()
    }
}

/// State shared between an attached binder and its handle.
#[derive(Debug)]
pub(crate) struct BindingShared {
    pub(crate) id: BindingId,
    pub(crate) name: Option<Arc<str>>,
    pub(crate) gate: Arc<DispatchGate>,
    disposed: AtomicBool,
    notifications: AtomicU64,
    invocations: AtomicU64,
}

impl BindingShared {
    pub(crate) fn new(name: Option<Arc<str>>) -> Self {
        Self {
            id: BindingId::new(),
            name,
            gate: Arc::new(DispatchGate::new()),
            disposed: AtomicBool::new(false),
            notifications: AtomicU64::new(0),
            invocations: AtomicU64::new(0),
        }
    }

    pub(crate) fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("anonymous")
    }

    pub(crate) fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    pub(crate) fn record_notification(&self) {
        self.notifications.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_invocation(&self) {
        self.invocations.fetch_add(1, Ordering::Relaxed);
    }
}

/// Handle to a subscriber attached to a store.
///
/// Attachment is fire-and-forget: dropping the handle leaves the binding
/// attached. Call [`dispose`](Binding::dispose) to stop it from reacting.
#[derive(Debug, Clone)]
pub struct Binding {
    shared: Arc<BindingShared>,
}

impl Binding {
    pub(crate) fn new(shared: Arc<BindingShared>) -> Self {
        Self { shared }
    }

    /// The binding's unique ID.
    pub fn id(&self) -> BindingId {
        self.shared.id
    }

    /// The name given with [`Connect::named`](super::Connect::named), if any.
    pub fn name(&self) -> Option<&str> {
        self.shared.name.as_deref()
    }

    /// Stop reacting to notifications.
    ///
    /// The store keeps the listener registered, since the store contract has
    /// no way to remove one, but it returns immediately from now on.
    /// Dispatchers already handed out keep following the gate.
    pub fn dispose(&self) {
        if !self.shared.disposed.swap(true, Ordering::SeqCst) {
            tracing::debug!(binding = self.shared.label(), "binding disposed");
        }
    }

    /// Whether [`dispose`](Binding::dispose) was called.
    pub fn is_disposed(&self) -> bool {
        self.shared.is_disposed()
    }

    /// Current state of the binding's dispatch gate.
    pub fn gate_state(&self) -> GateState {
        self.shared.gate.state()
    }

    /// Number of notifications handled (disposed ones excluded).
    pub fn notification_count(&self) -> u64 {
        self.shared.notifications.load(Ordering::Relaxed)
    }

    /// Number of times the subscriber was invoked.
    pub fn invocation_count(&self) -> u64 {
        self.shared.invocations.load(Ordering::Relaxed)
    }
}
