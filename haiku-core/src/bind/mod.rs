//! Store Bindings
//!
//! This module connects asynchronous side-effect handlers ("subscribers") to
//! a centrally-owned store. It is the Rust counterpart of a UI container:
//! instead of rendering, the subscriber starts side effects.
//!
//! # Concepts
//!
//! ## Selecting
//!
//! On every store notification the binding evaluates
//! `map_state_to_props(next_state, prev_state)`. A `None` result skips the
//! subscriber for that notification, which is how "nothing relevant changed"
//! is expressed. `prev_state` is the snapshot seen at the end of the previous
//! notification, so selectors can compute deltas (see
//! [`with_diff`](crate::selector::with_diff)).
//!
//! ## Guarded Dispatch
//!
//! Subscribers get a [`Dispatcher`] (through an optional dispatch map) to
//! feed actions back into the store. The dispatcher is guarded by a
//! per-binding [`DispatchGate`]: while the notification sweep is still on the
//! call stack every dispatch fails with
//! [`Error::SynchronousDispatchForbidden`](crate::Error::SynchronousDispatchForbidden).
//! The gate opens on the next turn of the [`Scheduler`], and never before the
//! sweep has returned, even when the turn runs on another thread. Work that must happen as a synchronous consequence of a state
//! change belongs in the reducer or the selector.
//!
//! # Lifecycle
//!
//! ```text
//! connect(map_state) ─► .map_dispatch(f) ─► .subscribe(subscriber) ─► .attach(&store)
//!                        (optional)                                    │
//!                                                                      ▼
//!                                    store.dispatch ─► notify ─► select ─► subscriber
//!                                                        │
//!                                                        └─► gate locked until next turn
//! ```
//!
//! Attaching returns a [`Binding`] handle. Dropping it does not detach;
//! [`Binding::dispose`] turns the binding inert.

mod binder;
mod connect;
mod dispatcher;
mod gate;
mod handle;
mod scheduler;
mod store;

pub use connect::{connect, Connect, Connected, DispatchMap, MapDispatch, NoDispatch, Props};
pub use dispatcher::Dispatcher;
pub use gate::{DispatchGate, GateState};
pub use handle::{Binding, BindingId};
pub use scheduler::{InlineScheduler, Scheduler, Task, TokioScheduler, TurnQueue};
pub use store::{Listener, Store};
