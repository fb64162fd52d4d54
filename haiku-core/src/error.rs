//! Error types for the binding layer.

use thiserror::Error;

/// Errors surfaced by the binding layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A subscriber tried to dispatch while its notification sweep was still
    /// on the stack.
    #[error(
        "Dispatching synchronously in a Subscriber is forbidden. Callbacks provided to \
         Subscribers are meant to be used by asynchronous side effects as a way to trigger \
         actions back into the store. Operations on the store to be done as a consequence of \
         a particular state change should be done in reducers or selectors instead."
    )]
    SynchronousDispatchForbidden,
}

impl Error {
    /// Whether this error was raised by a dispatch attempted inside a sweep.
    pub fn is_synchronous_dispatch(&self) -> bool {
        matches!(self, Error::SynchronousDispatchForbidden)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
