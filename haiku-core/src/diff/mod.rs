//! Structural Diff
//!
//! This module compares two projections of state and reports what changed
//! between them. It is the engine behind [`with_diff`](crate::selector::with_diff),
//! which lets a subscriber react only to the part of the state that is new.
//!
//! # Semantics
//!
//! A diff produces a [`DiffResult`] with two sides:
//!
//! - `before`: the part of the old projection that is absent or changed in
//!   the new one
//! - `after`: the part of the new projection that is absent or changed in the
//!   old one
//!
//! A side with nothing in it is reported as `None`, so two structurally equal
//! projections yield `{ before: None, after: None }`. Equality is value-based:
//! two distinct allocations with the same contents are equal.
//!
//! # Supported Shapes
//!
//! - `Vec<T>` of [`Keyed`] records, compared by key membership
//! - `IndexMap`, `BTreeMap` and `HashMap`, compared by key membership
//! - `serde_json::Value`, for dynamically shaped state
//!
//! Scalars carry no structure, so the JSON implementation reports them as
//! unchanged. Typed scalars do not implement [`Diff`] at all; use
//! [`changed`](crate::selector::changed) for those.

mod json;
mod keyed;
mod map;

pub use keyed::Keyed;

use serde::{Deserialize, Serialize};

/// The structural delta between two projections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffResult<T> {
    /// What the old projection had that the new one lacks or changed.
    pub before: Option<T>,

    /// What the new projection has that the old one lacked or had differently.
    pub after: Option<T>,
}

impl<T> DiffResult<T> {
    /// A result describing no change at all.
    pub fn unchanged() -> Self {
        Self {
            before: None,
            after: None,
        }
    }

    /// True when neither side carries anything.
    pub fn is_empty(&self) -> bool {
        self.before.is_none() && self.after.is_none()
    }

    /// Keep only the newly added or changed side.
    pub fn into_after(self) -> Option<T> {
        self.after
    }

    /// Keep only the removed or changed side.
    pub fn into_before(self) -> Option<T> {
        self.before
    }

    /// Transform both sides with the same function.
    pub fn map<U, F>(self, mut f: F) -> DiffResult<U>
    where
        F: FnMut(T) -> U,
    {
        DiffResult {
            before: self.before.map(&mut f),
            after: self.after.map(&mut f),
        }
    }
}

impl<T> Default for DiffResult<T> {
    fn default() -> Self {
        Self::unchanged()
    }
}

/// Types whose values can be compared structurally.
pub trait Diff: Sized {
    /// Compare `before` with `after`.
    fn diff(before: &Self, after: &Self) -> DiffResult<Self>;
}

/// Compare two projections.
///
/// ```rust,ignore
/// let before = vec![Row::new("a")];
/// let after = vec![Row::new("a"), Row::new("b")];
///
/// let delta = diff(&before, &after);
/// assert_eq!(delta.before, None);
/// assert_eq!(delta.after, Some(vec![Row::new("b")]));
/// ```
pub fn diff<T: Diff>(before: &T, after: &T) -> DiffResult<T> {
    T::diff(before, after)
}

/// Build a result from two subsets, dropping the empty ones.
fn from_subsets<C>(before: C, after: C, is_empty: impl Fn(&C) -> bool) -> DiffResult<C> {
    DiffResult {
        before: (!is_empty(&before)).then_some(before),
        after: (!is_empty(&after)).then_some(after),
    }
}
