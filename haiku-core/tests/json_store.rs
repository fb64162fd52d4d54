//! Bindings over a loosely typed JSON store.

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::{json, Value};

use haiku_core::bind::TurnQueue;
use haiku_core::test_harness::{Action, MemoryStore};
use haiku_core::{changed, connect, with_diff, Dispatcher, Props, Store};

type TodoStore = MemoryStore<Value, Action>;

fn reduce(state: &Value, action: &Action) -> Value {
    let mut next = state.clone();
    match action.kind.as_str() {
        "ADD_TASK" => {
            if let Some(tasks) = next["tasks"].as_array_mut() {
                tasks.push(action.payload.clone());
            }
        }
        "SET_AS_DONE" => {
            if let Some(tasks) = next["tasks"].as_array_mut() {
                for task in tasks.iter_mut() {
                    if task["key"] == action.payload["key"] {
                        task["done"] = json!(true);
                    }
                }
            }
        }
        "USER_INPUT" => next["input"] = action.payload.clone(),
        _ => {}
    }
    next
}

fn todo_store() -> Arc<TodoStore> {
    Arc::new(MemoryStore::new(json!({ "tasks": [], "input": "" }), reduce))
}

fn tasks(state: &Value) -> Value {
    state["tasks"].clone()
}

/// Test that a diff selector reports added tasks and changed tasks.
#[test]
fn diff_selector_reports_new_and_changed_tasks() {
    let store = todo_store();
    let queue = Arc::new(TurnQueue::new());
    let deltas = Arc::new(Mutex::new(Vec::new()));

    let task_diff = with_diff(tasks);
    let deltas_clone = deltas.clone();
    let _binding = connect(move |next: &Value, prev: &Value| {
        let delta = task_diff(prev, next);
        (!delta.is_empty()).then_some(delta)
    })
    .scheduler(queue.clone())
    .subscribe(move |props: Props<haiku_core::DiffResult<Value>>| {
        deltas_clone.lock().push(props.selected)
    })
    .attach(&store);

    // Add, touch an unrelated field, then complete the task
    store.dispatch(Action::new("ADD_TASK", json!({ "key": "k1", "done": false })));
    store.dispatch(Action::new("USER_INPUT", json!("milk")));
    store.dispatch(Action::new("SET_AS_DONE", json!({ "key": "k1" })));

    // The input change left the tasks alone, so only two deltas
    let deltas = deltas.lock();
    assert_eq!(deltas.len(), 2);

    assert_eq!(deltas[0].before, None);
    assert_eq!(deltas[0].after, Some(json!([{ "key": "k1", "done": false }])));

    assert_eq!(deltas[1].before, Some(json!([{ "key": "k1", "done": false }])));
    assert_eq!(deltas[1].after, Some(json!([{ "key": "k1", "done": true }])));
}

/// Test that a `changed` selector fires only when its projection changes.
#[test]
fn changed_selector_persists_input_only_when_it_changes() {
    let store = todo_store();
    let queue = Arc::new(TurnQueue::new());
    let persisted = Arc::new(Mutex::new(Vec::new()));

    let persisted_clone = persisted.clone();
    let binding = connect(changed(|state: &Value| state["input"].clone()))
        .named("sync-input")
        .scheduler(queue.clone())
        .subscribe(move |props: Props<Value>| persisted_clone.lock().push(props.selected))
        .attach(&store);

    // The task and the repeated input are not input changes
    store.dispatch(Action::new("USER_INPUT", json!("m")));
    store.dispatch(Action::new("ADD_TASK", json!({ "key": "k1" })));
    store.dispatch(Action::new("USER_INPUT", json!("mi")));
    store.dispatch(Action::new("USER_INPUT", json!("mi")));

    assert_eq!(*persisted.lock(), vec![json!("m"), json!("mi")]);
    assert_eq!(binding.name(), Some("sync-input"));
}

/// Test that a dispatcher kept past its turn forwards to the store.
#[test]
fn dispatch_after_the_turn_reaches_the_store() {
    let store = todo_store();
    let queue = Arc::new(TurnQueue::new());
    let pending = Arc::new(Mutex::new(Vec::new()));

    let pending_clone = pending.clone();
    let _binding = connect(|next: &Value, prev: &Value| {
        with_diff(tasks)(prev, next).into_after()
    })
    .scheduler(queue.clone())
    .map_dispatch(|dispatch: Dispatcher<Action>| dispatch)
    .subscribe(move |props: Props<Value, Dispatcher<Action>>| {
        for task in props.selected.as_array().into_iter().flatten() {
            if task["done"] != json!(true) {
                pending_clone
                    .lock()
                    .push((props.actions.clone(), task["key"].clone()));
            }
        }
    })
    .attach(&store);

    // Add a task and let the gate open
    store.dispatch(Action::new("ADD_TASK", json!({ "key": "k1", "done": false })));
    queue.run_until_idle();

    // Complete the pending work on a later turn, as an async side effect would.
    let work: Vec<_> = pending.lock().drain(..).collect();
    for (dispatch, key) in work {
        dispatch
            .dispatch(Action::new("SET_AS_DONE", json!({ "key": key })))
            .unwrap();
    }

    assert_eq!(
        store.state(),
        json!({ "tasks": [{ "key": "k1", "done": true }], "input": "" })
    );
}
