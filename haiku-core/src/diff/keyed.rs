//! Keyed record sequences.
//!
//! A sequence of records is compared by key: a record is part of a side when
//! its key is missing on the other side, or present with different contents.
//! The order of the source sequence is preserved on each side.

use std::hash::Hash;

use indexmap::IndexMap;

use super::{from_subsets, Diff, DiffResult};

/// A record with a stable identity inside a sequence.
pub trait Keyed {
    /// The identity type.
    type Key: Eq + Hash;

    /// The record's identity.
    fn key(&self) -> &Self::Key;
}

impl<T> Diff for Vec<T>
where
    T: Keyed + PartialEq + Clone,
{
    fn diff(before: &Self, after: &Self) -> DiffResult<Self> {
        let removed = changed_records(before, &index_by_key(after));
        let added = changed_records(after, &index_by_key(before));

        from_subsets(removed, added, Vec::is_empty)
    }
}

fn index_by_key<T: Keyed>(records: &[T]) -> IndexMap<&T::Key, &T> {
    records.iter().map(|record| (record.key(), record)).collect()
}

/// Records of `records` that `other` lacks or holds with different contents.
fn changed_records<T>(records: &[T], other: &IndexMap<&T::Key, &T>) -> Vec<T>
where
    T: Keyed + PartialEq + Clone,
{
    records
        .iter()
        .filter(|record| other.get(record.key()).map_or(true, |found| *found != *record))
        .cloned()
        .collect()
}
