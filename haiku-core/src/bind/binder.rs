//! The per-binding notification handler.

use std::marker::PhantomData;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use super::connect::{DispatchMap, Props};
use super::dispatcher::Dispatcher;
use super::handle::{Binding, BindingShared};
use super::scheduler::Scheduler;
use super::store::Store;

/// Everything one attached subscriber needs to react to a store.
///
/// The binder is owned by the listener it registers with the store, and it
/// only holds a weak reference back to the store to avoid a cycle.
pub(crate) struct Binder<S: Store, P, M, D, F> {
    store: Weak<S>,
    map_state: Arc<M>,
    map_dispatch: Arc<D>,
    subscriber: Arc<F>,
    scheduler: Arc<dyn Scheduler>,

    /// Snapshot observed at the end of the previous sweep.
    prev_state: Mutex<Arc<S::State>>,

    shared: Arc<BindingShared>,
    _props: PhantomData<fn() -> P>,
}

/// The pieces a binder is built from.
pub(crate) struct BinderParts<M, D, F> {
    pub(crate) map_state: Arc<M>,
    pub(crate) map_dispatch: Arc<D>,
    pub(crate) subscriber: Arc<F>,
    pub(crate) scheduler: Arc<dyn Scheduler>,
    pub(crate) name: Option<Arc<str>>,
}

impl<S, P, M, D, F> Binder<S, P, M, D, F>
where
    S: Store,
    P: 'static,
    M: Fn(&S::State, &S::State) -> Option<P> + Send + Sync + 'static,
    D: DispatchMap<S::Action>,
    F: Fn(Props<P, D::Actions>) + Send + Sync + 'static,
{
    /// Capture the store's current snapshot and start listening.
    pub(crate) fn attach(store: &Arc<S>, parts: BinderParts<M, D, F>) -> Binding {
        let shared = Arc::new(BindingShared::new(parts.name));

        let binder = Arc::new(Self {
            store: Arc::downgrade(store),
            map_state: parts.map_state,
            map_dispatch: parts.map_dispatch,
            subscriber: parts.subscriber,
            scheduler: parts.scheduler,
            prev_state: Mutex::new(Arc::new(store.state())),
            shared: Arc::clone(&shared),
            _props: PhantomData,
        });

        store.subscribe(Box::new(move || binder.notify()));
        tracing::debug!(binding = shared.label(), id = ?shared.id, "binding attached");

        Binding::new(shared)
    }

    /// Handle one store notification.
    ///
    /// No lock is held while collaborator code runs, so a subscriber that
    /// reaches around the gate and dispatches on the store directly re-enters
    /// here instead of deadlocking.
    fn notify(&self) {
        if self.shared.is_disposed() {
            return;
        }
        let Some(store) = self.store.upgrade() else {
            return;
        };
        self.shared.record_notification();
        let _sweep = self.shared.gate.enter();

        let next_state = store.state();
        let prev_state = Arc::clone(&*self.prev_state.lock());
        let selected = (self.map_state)(&next_state, &*prev_state);

        let cycle = self.shared.gate.arm(self.scheduler.as_ref());

        match selected {
            Some(selected) => {
                let dispatcher = Dispatcher::new(Arc::clone(&store), Arc::clone(&self.shared.gate));
                let actions = self.map_dispatch.bind(dispatcher);

                tracing::trace!(binding = self.shared.label(), cycle, "invoking subscriber");
                self.shared.record_invocation();
                (self.subscriber)(Props { selected, actions });
            }
            None => {
                tracing::trace!(binding = self.shared.label(), cycle, "nothing selected");
            }
        }

        // Re-read: the sweep may have mutated the store.
        *self.prev_state.lock() = Arc::new(store.state());
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use parking_lot::Mutex;

    use super::*;
    use crate::bind::{connect, GateState, TurnQueue};
    use crate::error::Error;
    use crate::test_harness::MemoryStore;

    type Counter = MemoryStore<i64, i64>;

    fn counter() -> Arc<Counter> {
        Arc::new(MemoryStore::new(0, |state: &i64, delta: &i64| state + delta))
    }

    #[test]
    fn subscriber_runs_only_when_something_is_selected() {
        let store = counter();
        let queue = Arc::new(TurnQueue::new());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let seen_clone = seen.clone();
        let binding = connect(|next: &i64, _prev: &i64| (next % 2 == 0).then_some(*next))
            .scheduler(queue.clone())
            .subscribe(move |props: Props<i64>| seen_clone.lock().push(props.selected))
            .attach(&store);

        for _ in 0..5 {
            store.dispatch(1);
        }

        assert_eq!(*seen.lock(), vec![2, 4]);
        assert_eq!(binding.notification_count(), 5);
        assert_eq!(binding.invocation_count(), 2);
    }

    #[test]
    fn prev_state_is_the_previous_sweeps_snapshot() {
        let store = counter();
        store.dispatch(10);

        let queue = Arc::new(TurnQueue::new());
        let pairs = Arc::new(Mutex::new(Vec::new()));

        let pairs_clone = pairs.clone();
        let _binding = connect(move |next: &i64, prev: &i64| {
            pairs_clone.lock().push((*prev, *next));
            None::<()>
        })
        .scheduler(queue.clone())
        .subscribe(|_: Props<()>| {})
        .attach(&store);

        store.dispatch(1);
        store.dispatch(2);
        store.dispatch(3);

        assert_eq!(*pairs.lock(), vec![(10, 11), (11, 13), (13, 16)]);
    }

    #[test]
    fn dispatch_is_refused_until_the_next_turn() {
        let store = counter();
        let queue = Arc::new(TurnQueue::new());
        let inside = Arc::new(Mutex::new(None));
        let kept = Arc::new(Mutex::new(None));

        let inside_clone = inside.clone();
        let kept_clone = kept.clone();
        let binding = connect(|next: &i64, prev: &i64| (next != prev).then_some(*next))
            .scheduler(queue.clone())
            .map_dispatch(|dispatch: Dispatcher<i64>| dispatch)
            .subscribe(move |props: Props<i64, Dispatcher<i64>>| {
                *inside_clone.lock() = Some(props.actions.dispatch(100));
                *kept_clone.lock() = Some(props.actions);
            })
            .attach(&store);

        store.dispatch(1);

        assert_eq!(*inside.lock(), Some(Err(Error::SynchronousDispatchForbidden)));
        assert_eq!(store.state(), 1);

        // The sweep returned, but the turn has not come yet.
        let dispatcher = kept.lock().take().unwrap();
        assert!(dispatcher.is_locked());
        assert_eq!(dispatcher.dispatch(5), Err(Error::SynchronousDispatchForbidden));

        queue.run_turn();
        assert_eq!(binding.gate_state(), GateState::Unlocked);
        assert_eq!(dispatcher.dispatch(5), Ok(()));
        assert_eq!(store.state(), 6);

        // That dispatch started a new sweep, which locked the gate again.
        assert!(dispatcher.is_locked());
    }

    #[test]
    fn disposed_binding_ignores_notifications() {
        let store = counter();
        let queue = Arc::new(TurnQueue::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let calls_clone = calls.clone();
        let binding = connect(|next: &i64, _prev: &i64| Some(*next))
            .scheduler(queue.clone())
            .subscribe(move |_: Props<i64>| {
                calls_clone.fetch_add(1, Ordering::SeqCst);
            })
            .attach(&store);

        store.dispatch(1);
        binding.dispose();
        store.dispatch(1);

        assert!(binding.is_disposed());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(binding.notification_count(), 1);
        assert_eq!(store.listener_count(), 1);
    }

    #[test]
    fn bindings_on_one_store_are_independent() {
        let store = counter();
        let queue = Arc::new(TurnQueue::new());

        let connected = connect(|next: &i64, _prev: &i64| (*next > 1).then_some(*next))
            .scheduler(queue.clone())
            .subscribe(|_: Props<i64>| {});

        let first = connected.attach(&store);
        store.dispatch(1);
        let second = connected.attach(&store);
        store.dispatch(1);

        assert_ne!(first.id(), second.id());
        assert_eq!(first.notification_count(), 2);
        assert_eq!(second.notification_count(), 1);
        assert_eq!(first.invocation_count(), 1);
        assert_eq!(second.invocation_count(), 1);

        first.dispose();
        store.dispatch(1);
        assert_eq!(first.invocation_count(), 1);
        assert_eq!(second.invocation_count(), 2);
    }

    #[test]
    fn direct_store_dispatch_from_a_subscriber_reenters() {
        let store = counter();
        let queue = Arc::new(TurnQueue::new());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let inner_store = store.clone();
        let seen_clone = seen.clone();
        let _binding = connect(|next: &i64, prev: &i64| (next != prev).then_some(*next))
            .scheduler(queue.clone())
            .named("bouncer")
            .subscribe(move |props: Props<i64>| {
                seen_clone.lock().push(props.selected);
                if props.selected == 1 {
                    inner_store.dispatch(1);
                }
            })
            .attach(&store);

        store.dispatch(1);

        assert_eq!(*seen.lock(), vec![1, 2]);
        assert_eq!(store.state(), 2);
    }

    #[test]
    fn attach_outside_a_runtime_unlocks_when_the_sweep_returns() {
        let store = counter();
        let inside = Arc::new(Mutex::new(None));
        let kept = Arc::new(Mutex::new(None));

        let inside_clone = inside.clone();
        let kept_clone = kept.clone();
        let binding = connect(|next: &i64, prev: &i64| (next != prev).then_some(*next))
            .map_dispatch(|dispatch: Dispatcher<i64>| dispatch)
            .subscribe(move |props: Props<i64, Dispatcher<i64>>| {
                if props.selected == 1 {
                    *inside_clone.lock() = Some(props.actions.dispatch(100));
                    *kept_clone.lock() = Some(props.actions);
                }
            })
            .attach(&store);

        store.dispatch(1);

        // Refused inside the sweep, open right after it returned.
        assert_eq!(*inside.lock(), Some(Err(Error::SynchronousDispatchForbidden)));
        assert_eq!(binding.gate_state(), GateState::Unlocked);

        let dispatcher = kept.lock().take().unwrap();
        assert_eq!(dispatcher.dispatch(10), Ok(()));
        assert_eq!(store.state(), 11);
        assert_eq!(binding.invocation_count(), 2);
    }
}
