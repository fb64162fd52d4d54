//! The store contract.
//!
//! The binding layer never owns state. It talks to whatever store the
//! application already has through this trait.

/// A zero-argument change listener.
pub type Listener = Box<dyn Fn() + Send + Sync + 'static>;

/// A centrally-owned state container.
///
/// Implementations must uphold three rules:
///
/// - [`state`](Store::state) returns the same snapshot between mutations
/// - listeners run synchronously after every committed mutation, in the
///   order they were registered
/// - [`dispatch`](Store::dispatch) applies the mutation before notifying
pub trait Store: Send + Sync + 'static {
    /// The snapshot type.
    type State: Clone + Send + Sync + 'static;

    /// The mutation request type.
    type Action: Send + 'static;

    /// The current snapshot.
    fn state(&self) -> Self::State;

    /// Register a listener invoked after every mutation.
    fn subscribe(&self, listener: Listener);

    /// Apply an action and notify every listener once.
    fn dispatch(&self, action: Self::Action);
}
