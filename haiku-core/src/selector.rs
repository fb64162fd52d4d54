//! Selector Helpers
//!
//! Building blocks for `map_state_to_props` functions. A selector here is a
//! plain projection `Fn(&State) -> T`; the helpers lift it into something that
//! looks at two snapshots at once.
//!
//! # Example
//!
//! ```rust,ignore
//! let new_keys = with_diff(|state: &State| state.item_keys());
//!
//! let map_state = move |next: &State, prev: &State| {
//!     new_keys(prev, next).into_after().map(|keys| Props::from_keys(next, keys))
//! };
//! ```
//!
//! Note the argument order: diff selectors take `(prev, next)`, while
//! `map_state_to_props` and [`changed`] take `(next, prev)`.

use crate::diff::{diff, Diff, DiffResult};

/// Apply `selector` to two snapshots and diff the projections.
///
/// The returned function takes `(prev_state, next_state)`.
pub fn with_diff<S, T, F>(selector: F) -> impl Fn(&S, &S) -> DiffResult<T> + Send + Sync
where
    F: Fn(&S) -> T + Send + Sync,
    T: Diff,
{
    move |prev: &S, next: &S| diff(&selector(prev), &selector(next))
}

/// Select a projection only when it differs from the previous snapshot's.
///
/// The returned function takes `(next_state, prev_state)`, so it can be used
/// directly as a `map_state_to_props`.
pub fn changed<S, T, F>(selector: F) -> impl Fn(&S, &S) -> Option<T> + Send + Sync
where
    F: Fn(&S) -> T + Send + Sync,
    T: PartialEq,
{
    move |next: &S, prev: &S| {
        let projected = selector(next);
        (projected != selector(prev)).then_some(projected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::Keyed;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        key: u32,
    }

    impl Keyed for Row {
        type Key = u32;

        fn key(&self) -> &u32 {
            &self.key
        }
    }

    #[derive(Debug, Clone, Default)]
    struct State {
        rows: Vec<Row>,
        input: String,
    }

    fn rows(state: &State) -> Vec<Row> {
        state.rows.clone()
    }

    #[test]
    fn diff_of_a_state_with_itself_is_empty() {
        let state = State {
            rows: vec![Row { key: 1 }],
            input: String::new(),
        };

        assert!(with_diff(rows)(&state, &state).is_empty());
    }

    #[test]
    fn diff_reports_only_new_rows() {
        let s1 = State {
            rows: vec![Row { key: 1 }],
            ..State::default()
        };
        let s2 = State {
            rows: vec![Row { key: 1 }, Row { key: 2 }],
            ..State::default()
        };

        let result = with_diff(rows)(&s1, &s2);
        assert_eq!(result.before, None);
        assert_eq!(result.after, Some(vec![Row { key: 2 }]));
    }

    #[test]
    fn changed_skips_equal_projections() {
        let input = changed(|state: &State| state.input.clone());

        let prev = State::default();
        let next = State {
            input: "milk".to_string(),
            ..State::default()
        };

        assert_eq!(input(&next, &prev), Some("milk".to_string()));
        assert_eq!(input(&next, &next), None);
    }
}
