//! Haiku Core
//!
//! This crate binds asynchronous side-effect handlers to a synchronized,
//! centrally-owned state store. It implements:
//!
//! - Store bindings that select a slice of state on every change
//! - A dispatch gate that refuses actions fed back during the same
//!   notification sweep
//! - A structural diff engine and selector helpers built on it
//!
//! The crate does not own state. Any store satisfying the [`Store`] contract
//! can be bound.
//!
//! # Architecture
//!
//! - `bind`: `connect`, the binder, the dispatch gate and schedulers
//! - `diff`: structural comparison of state projections
//! - `selector`: helpers for writing `map_state_to_props`
//! - `test_harness`: an in-memory reducer store for tests and demos
//!
//! # Example
//!
//! ```rust,ignore
//! use haiku_core::{connect, with_diff, Dispatcher, Props};
//!
//! let new_items = with_diff(|state: &State| state.item_keys());
//!
//! connect(move |next: &State, prev: &State| new_items(prev, next).into_after())
//!     .map_dispatch(|dispatch: Dispatcher<Action>| SaveActions { dispatch })
//!     .subscribe(|props: Props<Vec<ItemKey>, SaveActions>| {
//!         for key in props.selected {
//!             let actions = props.actions.clone();
//!             tokio::spawn(async move {
//!                 save(&key).await;
//!                 // The sweep that handed out `actions` has long returned.
//!                 actions.item_saved(key).unwrap();
//!             });
//!         }
//!     })
//!     .attach(&store);
//! ```

pub mod bind;
pub mod diff;
pub mod error;
pub mod selector;
pub mod test_harness;

pub use bind::{connect, Binding, Dispatcher, Props, Scheduler, Store};
pub use diff::{diff, Diff, DiffResult, Keyed};
pub use error::{Error, Result};
pub use selector::{changed, with_diff};
