//! Diffs over `serde_json::Value`.
//!
//! Objects are compared key by key. Arrays are compared by the `"key"` field
//! of their records when every element carries one, and by element
//! membership otherwise. `null` stands in for an empty container of the
//! other side's shape. Scalars report no change.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use super::{from_subsets, Diff, DiffResult};

/// Field used to identify records inside arrays.
const RECORD_KEY: &str = "key";

impl Diff for Value {
    fn diff(before: &Self, after: &Self) -> DiffResult<Self> {
        if before == after {
            return DiffResult::unchanged();
        }

        let empty_object = Map::new();
        let empty_array: Vec<Value> = Vec::new();

        match (before, after) {
            (Value::Object(b), Value::Object(a)) => diff_objects(b, a),
            (Value::Null, Value::Object(a)) => diff_objects(&empty_object, a),
            (Value::Object(b), Value::Null) => diff_objects(b, &empty_object),
            (Value::Array(b), Value::Array(a)) => diff_arrays(b, a),
            (Value::Null, Value::Array(a)) => diff_arrays(&empty_array, a),
            (Value::Array(b), Value::Null) => diff_arrays(b, &empty_array),
            _ => DiffResult::unchanged(),
        }
    }
}

fn diff_objects(before: &Map<String, Value>, after: &Map<String, Value>) -> DiffResult<Value> {
    let changed = |from: &Map<String, Value>, other: &Map<String, Value>| -> Map<String, Value> {
        from.iter()
            .filter(|(key, value)| other.get(key.as_str()) != Some(*value))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    };

    from_subsets(changed(before, after), changed(after, before), Map::is_empty)
        .map(Value::Object)
}

fn diff_arrays(before: &[Value], after: &[Value]) -> DiffResult<Value> {
    let keyed = |records: &[Value]| records.iter().all(|record| record_key(record).is_some());

    let (removed, added) = if keyed(before) && keyed(after) {
        let before_index = index_records(before);
        let after_index = index_records(after);
        (
            changed_records(before, &after_index),
            changed_records(after, &before_index),
        )
    } else {
        (
            missing_elements(before, after),
            missing_elements(after, before),
        )
    };

    from_subsets(removed, added, Vec::is_empty).map(Value::Array)
}

/// The identity of an array record, rendered as its JSON text.
fn record_key(record: &Value) -> Option<String> {
    record
        .as_object()
        .and_then(|fields| fields.get(RECORD_KEY))
        .map(Value::to_string)
}

fn index_records(records: &[Value]) -> IndexMap<String, &Value> {
    records
        .iter()
        .filter_map(|record| record_key(record).map(|key| (key, record)))
        .collect()
}

fn changed_records(records: &[Value], other: &IndexMap<String, &Value>) -> Vec<Value> {
    records
        .iter()
        .filter(|record| match record_key(record) {
            Some(key) => other.get(&key).map_or(true, |found| *found != *record),
            None => true,
        })
        .cloned()
        .collect()
}

fn missing_elements(elements: &[Value], other: &[Value]) -> Vec<Value> {
    elements
        .iter()
        .filter(|element| !other.contains(element))
        .cloned()
        .collect()
}
