//! Mapping diffs.
//!
//! An entry belongs to a side when its key is missing on the other side or
//! maps to a different value there.

use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};

use indexmap::IndexMap;

use super::{from_subsets, Diff, DiffResult};

/// Entries of `entries` that `lookup` does not resolve to an equal value.
fn changed_entries<'a, K, V, C>(
    entries: impl Iterator<Item = (&'a K, &'a V)>,
    lookup: impl Fn(&K) -> Option<&'a V>,
) -> C
where
    K: Clone + 'a,
    V: PartialEq + Clone + 'a,
    C: FromIterator<(K, V)>,
{
    entries
        .filter(|(key, value)| lookup(*key) != Some(*value))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

impl<K, V, S> Diff for IndexMap<K, V, S>
where
    K: Hash + Eq + Clone,
    V: PartialEq + Clone,
    S: BuildHasher + Default,
{
    fn diff(before: &Self, after: &Self) -> DiffResult<Self> {
        let removed: Self = changed_entries(before.iter(), |key| after.get(key));
        let added: Self = changed_entries(after.iter(), |key| before.get(key));

        from_subsets(removed, added, IndexMap::is_empty)
    }
}

impl<K, V> Diff for BTreeMap<K, V>
where
    K: Ord + Clone,
    V: PartialEq + Clone,
{
    fn diff(before: &Self, after: &Self) -> DiffResult<Self> {
        let removed: Self = changed_entries(before.iter(), |key| after.get(key));
        let added: Self = changed_entries(after.iter(), |key| before.get(key));

        from_subsets(removed, added, BTreeMap::is_empty)
    }
}

impl<K, V, S> Diff for HashMap<K, V, S>
where
    K: Hash + Eq + Clone,
    V: PartialEq + Clone,
    S: BuildHasher + Default,
{
    fn diff(before: &Self, after: &Self) -> DiffResult<Self> {
        let removed: Self = changed_entries(before.iter(), |key| after.get(key));
        let added: Self = changed_entries(after.iter(), |key| before.get(key));

        from_subsets(removed, added, HashMap::is_empty)
    }
}
