//! The `connect` builder.

use std::fmt;
use std::sync::Arc;

use super::binder::{Binder, BinderParts};
use super::dispatcher::Dispatcher;
use super::handle::Binding;
use super::scheduler::{InlineScheduler, Scheduler, TokioScheduler};
use super::store::Store;

/// What a subscriber receives: the selected props and the bound actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Props<P, A = ()> {
    /// The value returned by `map_state_to_props`.
    pub selected: P,

    /// The value returned by `map_dispatch`, or `()` without one.
    pub actions: A,
}

/// Turns a guarded dispatcher into the actions handed to a subscriber.
pub trait DispatchMap<A>: Send + Sync + 'static {
    /// What the subscriber receives as [`Props::actions`].
    type Actions;

    /// Bind the actions for one sweep.
    fn bind(&self, dispatcher: Dispatcher<A>) -> Self::Actions;
}

/// No dispatch map: subscribers receive `()` as their actions.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDispatch;

impl<A> DispatchMap<A> for NoDispatch {
    type Actions = ();

    fn bind(&self, _dispatcher: Dispatcher<A>) {}
}

/// A dispatch map backed by a function.
#[derive(Clone, Copy)]
pub struct MapDispatch<F>(F);

impl<A, F, R> DispatchMap<A> for MapDispatch<F>
where
    F: Fn(Dispatcher<A>) -> R + Send + Sync + 'static,
{
    type Actions = R;

    fn bind(&self, dispatcher: Dispatcher<A>) -> R {
        (self.0)(dispatcher)
    }
}

impl<F> fmt::Debug for MapDispatch<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MapDispatch(..)")
    }
}

/// Start binding a subscriber to a store.
///
/// `map_state_to_props` receives `(next_state, prev_state)` and returns
/// `None` when the subscriber should sit this notification out.
///
/// ```rust,ignore
/// let binding = connect(changed(|state: &State| state.input.clone()))
///     .named("sync-input")
///     .subscribe(|props: Props<String>| persist_input(props.selected))
///     .attach(&store);
/// ```
pub fn connect<St, P, M>(map_state_to_props: M) -> Connect<M>
where
    M: Fn(&St, &St) -> Option<P> + Send + Sync + 'static,
{
    Connect {
        map_state: Arc::new(map_state_to_props),
        map_dispatch: Arc::new(NoDispatch),
        name: None,
        scheduler: None,
    }
}

/// Configuration for a binding, before a subscriber is chosen.
pub struct Connect<M, D = NoDispatch> {
    map_state: Arc<M>,
    map_dispatch: Arc<D>,
    name: Option<Arc<str>>,
    scheduler: Option<Arc<dyn Scheduler>>,
}

impl<M, D> Connect<M, D> {
    /// Bind actions for the subscriber from the guarded dispatcher.
    pub fn map_dispatch<A, R, F>(self, map_dispatch: F) -> Connect<M, MapDispatch<F>>
    where
        F: Fn(Dispatcher<A>) -> R + Send + Sync + 'static,
    {
        Connect {
            map_state: self.map_state,
            map_dispatch: Arc::new(MapDispatch(map_dispatch)),
            name: self.name,
            scheduler: self.scheduler,
        }
    }

    /// Name the binding in logs.
    pub fn named(mut self, name: impl Into<Arc<str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Use `scheduler` to unlock the dispatch gate.
    ///
    /// Defaults to a [`TokioScheduler`] on the runtime that calls `attach`,
    /// or to an [`InlineScheduler`] when `attach` runs outside a runtime.
    pub fn scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Choose the subscriber.
    pub fn subscribe<F>(self, subscriber: F) -> Connected<M, D, F> {
        Connected {
            map_state: self.map_state,
            map_dispatch: self.map_dispatch,
            subscriber: Arc::new(subscriber),
            name: self.name,
            scheduler: self.scheduler,
        }
    }
}

impl<M, D> fmt::Debug for Connect<M, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connect")
            .field("name", &self.name)
            .field("custom_scheduler", &self.scheduler.is_some())
            .finish()
    }
}

/// A subscriber ready to be attached to any number of stores.
pub struct Connected<M, D, F> {
    map_state: Arc<M>,
    map_dispatch: Arc<D>,
    subscriber: Arc<F>,
    name: Option<Arc<str>>,
    scheduler: Option<Arc<dyn Scheduler>>,
}

impl<M, D, F> Connected<M, D, F> {
    /// Attach to `store`.
    ///
    /// Captures the store's current snapshot as the first `prev_state` and
    /// registers a listener. Every call creates an independent binding with
    /// its own snapshot and gate.
    ///
    /// Without a configured scheduler the gate unlocks on the tokio runtime
    /// current at attach time. Outside a runtime it unlocks as soon as each
    /// sweep returns.
    pub fn attach<S, P>(&self, store: &Arc<S>) -> Binding
    where
        S: Store,
        P: 'static,
        M: Fn(&S::State, &S::State) -> Option<P> + Send + Sync + 'static,
        D: DispatchMap<S::Action>,
        F: Fn(Props<P, D::Actions>) + Send + Sync + 'static,
    {
        let scheduler: Arc<dyn Scheduler> = match &self.scheduler {
            Some(scheduler) => Arc::clone(scheduler),
            None => match TokioScheduler::try_current() {
                Some(tokio) => Arc::new(tokio),
                None => {
                    tracing::debug!(
                        binding = self.name.as_deref().unwrap_or("anonymous"),
                        "no tokio runtime, gate unlocks when each sweep returns"
                    );
                    Arc::new(InlineScheduler)
                }
            },
        };

        Binder::<S, P, M, D, F>::attach(
            store,
            BinderParts {
                map_state: Arc::clone(&self.map_state),
                map_dispatch: Arc::clone(&self.map_dispatch),
                subscriber: Arc::clone(&self.subscriber),
                scheduler,
                name: self.name.clone(),
            },
        )
    }
}

impl<M, D, F> Clone for Connected<M, D, F> {
    fn clone(&self) -> Self {
        Self {
            map_state: Arc::clone(&self.map_state),
            map_dispatch: Arc::clone(&self.map_dispatch),
            subscriber: Arc::clone(&self.subscriber),
            name: self.name.clone(),
            scheduler: self.scheduler.clone(),
        }
    }
}

impl<M, D, F> fmt::Debug for Connected<M, D, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connected")
            .field("name", &self.name)
            .field("custom_scheduler", &self.scheduler.is_some())
            .finish()
    }
}
