//! The state store: serialized owner of the live stack.
//!
//! Every submission runs resolution, dependency notification, the state
//! write and the publish as one critical section, so concurrent callers
//! observe a total order of submissions.

mod broadcast;

pub use broadcast::StateStream;

use crate::core::{Action, BackStateStack, State, StateWithId};
use crate::dependency::{DependencyEvent, StateDependencyManager};
use crate::engine::{resolve, FsmError, LiveStack, TransitionCallbacks, TransitionsFactory};
use crate::snapshot::{Snapshot, StateKeeper};
use broadcast::StateBroadcast;
use parking_lot::Mutex;
use std::sync::Arc;

/// Collaborators a store is opened with.
pub(crate) struct StoreParts<A: Action> {
    pub initial: A::State,
    pub factory: Arc<dyn TransitionsFactory<A>>,
    pub dependencies: Option<Arc<dyn StateDependencyManager<A::State>>>,
    pub callbacks: Option<Arc<dyn TransitionCallbacks<A>>>,
    pub keeper: Option<Arc<dyn StateKeeper<A::State>>>,
}

/// Owner of the current state, back stack and dependency lifecycle.
///
/// Cloning a store is cheap; clones share the same machine.
///
/// # Example
///
/// ```rust
/// use waypoint::core::{Action, BackStackStrategy, Transition};
/// use waypoint::fsm_state;
/// use waypoint::store::Store;
///
/// fsm_state! {
///     pub enum Screen: ScreenTag {
///         Home,
///         Settings,
///     }
/// }
///
/// #[derive(Debug)]
/// struct OpenSettings;
///
/// impl Action for OpenSettings {
///     type State = Screen;
///     fn name(&self) -> &str {
///         "OpenSettings"
///     }
/// }
///
/// let store = Store::new(Screen::Home, |_: &OpenSettings| {
///     vec![Transition::forward(ScreenTag::Home, ScreenTag::Settings, |_| Screen::Settings)
///         .strategy(BackStackStrategy::Add)]
/// });
///
/// let mut states = store.observe();
/// assert_eq!(states.try_recv(), Some(Screen::Home));
///
/// assert!(store.submit(OpenSettings).unwrap());
/// assert_eq!(store.current_state(), Screen::Settings);
/// assert_eq!(states.try_recv(), Some(Screen::Settings));
///
/// // Nothing matches from Settings: the state is left as it is.
/// assert!(!store.submit(OpenSettings).unwrap());
/// ```
pub struct Store<A: Action> {
    inner: Arc<StoreInner<A>>,
}

struct StoreInner<A: Action> {
    live: Mutex<LiveStack<A::State>>,
    broadcast: StateBroadcast<A::State>,
    factory: Arc<dyn TransitionsFactory<A>>,
    dependencies: Option<Arc<dyn StateDependencyManager<A::State>>>,
    callbacks: Option<Arc<dyn TransitionCallbacks<A>>>,
    keeper: Option<Arc<dyn StateKeeper<A::State>>>,
}

impl<A: Action> Clone for Store<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A: Action> Store<A> {
    /// Create a store with only a transitions factory.
    ///
    /// Use [`FeatureBuilder`](crate::builder::FeatureBuilder) to attach a
    /// dependency manager, callbacks, a state keeper or an async worker.
    pub fn new<F>(initial: A::State, factory: F) -> Self
    where
        F: TransitionsFactory<A> + 'static,
    {
        Self::open(StoreParts {
            initial,
            factory: Arc::new(factory),
            dependencies: None,
            callbacks: None,
            keeper: None,
        })
    }

    /// Open a store, restoring the live stack from the keeper if it has a
    /// valid snapshot, and fire `init` for every live state.
    pub(crate) fn open(parts: StoreParts<A>) -> Self {
        let live = match parts.keeper.as_ref().and_then(|keeper| keeper.restore()) {
            Some(snapshot) => match snapshot.validate() {
                Ok(()) => {
                    tracing::debug!(
                        snapshot = %snapshot.id,
                        state = ?snapshot.live.current_state(),
                        "Restored live stack from snapshot"
                    );
                    snapshot.live
                }
                Err(error) => {
                    tracing::warn!(%error, "Ignoring invalid snapshot");
                    LiveStack::new(parts.initial)
                }
            },
            None => LiveStack::new(parts.initial),
        };

        if let Some(dependencies) = &parts.dependencies {
            for entry in live.live_entries() {
                DependencyEvent::Init(entry.clone()).notify(dependencies.as_ref());
            }
        }

        Self {
            inner: Arc::new(StoreInner {
                broadcast: StateBroadcast::new(live.current_state().clone()),
                live: Mutex::new(live),
                factory: parts.factory,
                dependencies: parts.dependencies,
                callbacks: parts.callbacks,
                keeper: parts.keeper,
            }),
        }
    }

    /// Submit an action.
    ///
    /// Returns `Ok(true)` when a new state was published and `Ok(false)`
    /// when the state did not change (no transition matched, or the
    /// selected transition reduced to an equal state).
    ///
    /// # Errors
    ///
    /// [`FsmError::MisconfiguredFactory`] when the factory broke its
    /// contract for this action. The state is left untouched.
    pub fn submit(&self, action: A) -> Result<bool, FsmError> {
        self.submit_if(action, || true)
    }

    /// Submit `action` if `admit` still holds once the critical section is
    /// entered.
    pub(crate) fn submit_if<F>(&self, action: A, admit: F) -> Result<bool, FsmError>
    where
        F: FnOnce() -> bool,
    {
        let transitions = self.inner.factory.create(&action);

        let mut live = self.inner.live.lock();
        if !admit() {
            return Err(FsmError::TaskCancelled {
                action: action.name().to_string(),
            });
        }

        let resolution = resolve(&action, &transitions, &live, self.inner.callbacks.as_deref())?;
        let Some(next) = resolution.next else {
            return Ok(false);
        };

        if let Some(dependencies) = &self.inner.dependencies {
            for event in &resolution.events {
                event.notify(dependencies.as_ref());
            }
        }

        *live = next;
        let current = live.current();
        tracing::debug!(
            action = action.name(),
            id = current.id,
            state = current.state.name(),
            depth = live.back_stack().len(),
            "State committed"
        );

        self.inner.broadcast.publish(current.state.clone());
        self.save(&live);
        Ok(true)
    }

    fn save(&self, live: &LiveStack<A::State>) {
        if let Some(keeper) = &self.inner.keeper {
            if let Err(error) = keeper.save(&Snapshot::capture(live)) {
                tracing::warn!(%error, "Failed to save snapshot");
            }
        }
    }

    /// The current state.
    pub fn current_state(&self) -> A::State {
        self.inner.live.lock().current_state().clone()
    }

    /// The current state with its id.
    pub fn current(&self) -> StateWithId<A::State> {
        self.inner.live.lock().current().clone()
    }

    /// A copy of the back stack.
    pub fn back_stack(&self) -> BackStateStack<A::State> {
        self.inner.live.lock().back_stack().clone()
    }

    /// A copy of the whole live stack.
    pub fn live_stack(&self) -> LiveStack<A::State> {
        self.inner.live.lock().clone()
    }

    /// Capture a snapshot of the live stack.
    pub fn snapshot(&self) -> Snapshot<A::State> {
        Snapshot::capture(&self.inner.live.lock())
    }

    /// Subscribe to states: the current one first, then every published
    /// one in order.
    pub fn observe(&self) -> StateStream<A::State> {
        self.inner.broadcast.subscribe()
    }

    /// Number of attached state streams.
    pub fn subscriber_count(&self) -> usize {
        self.inner.broadcast.subscriber_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BackStackStrategy, State, Transition};
    use crate::snapshot::InMemoryStateKeeper;

    crate::fsm_state! {
        enum Page: PageTag {
            Home,
            List,
            Item { id: u32 },
        }
    }

    #[derive(Debug)]
    enum Nav {
        OpenList,
        OpenItem(u32),
        Back,
        Home,
    }

    impl Action for Nav {
        type State = Page;

        fn name(&self) -> &str {
            match self {
                Nav::OpenList => "OpenList",
                Nav::OpenItem(_) => "OpenItem",
                Nav::Back => "Back",
                Nav::Home => "Home",
            }
        }
    }

    fn transitions(action: &Nav) -> Vec<Transition<Page>> {
        match action {
            Nav::OpenList => vec![
                Transition::forward(PageTag::Home, PageTag::List, |_| Page::List)
                    .strategy(BackStackStrategy::Add),
            ],
            Nav::OpenItem(id) => {
                let id = *id;
                vec![
                    Transition::forward(PageTag::List, PageTag::Item, move |_| Page::Item { id })
                        .strategy(BackStackStrategy::Add),
                    Transition::forward(PageTag::Item, PageTag::Item, move |_| Page::Item { id })
                        .strategy(BackStackStrategy::Add),
                ]
            }
            Nav::Back => vec![Transition::back(PageTag::Item, PageTag::List, |_, list| {
                list.clone()
            })],
            Nav::Home => vec![
                Transition::forward(PageTag::List, PageTag::Home, |_| Page::Home)
                    .strategy(BackStackStrategy::NewRoot),
                Transition::forward(PageTag::Item, PageTag::Home, |_| Page::Home)
                    .strategy(BackStackStrategy::NewRoot),
            ],
        }
    }

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<(bool, u64)>>,
    }

    impl StateDependencyManager<Page> for Recorder {
        fn init_dependency_for_state(&self, id: u64, _state: &Page) {
            self.events.lock().push((true, id));
        }

        fn remove_dependency_for_state(&self, id: u64, _state: &Page) {
            self.events.lock().push((false, id));
        }
    }

    fn store_with(
        recorder: &Arc<Recorder>,
        keeper: Option<Arc<InMemoryStateKeeper>>,
    ) -> Store<Nav> {
        Store::open(StoreParts {
            initial: Page::Home,
            factory: Arc::new(transitions),
            dependencies: Some(recorder.clone()),
            callbacks: None,
            keeper: keeper.map(|k| k as Arc<dyn StateKeeper<Page>>),
        })
    }

    #[test]
    fn construction_inits_root() {
        let recorder = Arc::new(Recorder::default());
        let store = store_with(&recorder, None);

        assert_eq!(*recorder.events.lock(), vec![(true, 0)]);
        assert!(store.current().is_root());
    }

    #[test]
    fn unmatched_action_publishes_nothing() {
        let store = Store::new(Page::Home, transitions);
        let mut states = store.observe();
        assert_eq!(states.try_recv(), Some(Page::Home));

        assert!(!store.submit(Nav::Back).unwrap());

        assert_eq!(store.current_state(), Page::Home);
        assert_eq!(states.try_recv(), None);
    }

    #[test]
    fn navigation_fires_balanced_dependency_events() {
        let recorder = Arc::new(Recorder::default());
        let store = store_with(&recorder, None);

        store.submit(Nav::OpenList).unwrap();
        store.submit(Nav::OpenItem(1)).unwrap();
        store.submit(Nav::OpenItem(2)).unwrap();
        store.submit(Nav::Back).unwrap();

        assert_eq!(store.current_state(), Page::List);
        assert_eq!(store.current().id, 1);
        assert_eq!(
            *recorder.events.lock(),
            vec![(true, 0), (true, 1), (true, 2), (true, 3), (false, 2), (false, 3)]
        );
    }

    #[test]
    fn observers_receive_states_in_submission_order() {
        let store = Store::new(Page::Home, transitions);
        let mut states = store.observe();

        store.submit(Nav::OpenList).unwrap();
        store.submit(Nav::OpenItem(4)).unwrap();
        store.submit(Nav::Home).unwrap();

        let received: Vec<_> = std::iter::from_fn(|| states.try_recv()).collect();
        assert_eq!(
            received,
            vec![Page::Home, Page::List, Page::Item { id: 4 }, Page::Home]
        );
    }

    #[test]
    fn concurrent_submissions_are_serialized() {
        let store = Store::new(Page::List, transitions);

        let handles: Vec<_> = (0..8)
            .map(|n| {
                let store = store.clone();
                std::thread::spawn(move || store.submit(Nav::OpenItem(n)).unwrap())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let live = store.live_stack();
        assert!(live.back_stack().is_well_ordered());
        assert_eq!(live.last_id(), 8);
        assert_eq!(live.back_stack().len(), 8);
        assert_eq!(store.current_state().tag(), PageTag::Item);
    }

    #[test]
    fn rejected_admission_reports_cancelled_task() {
        let store = Store::new(Page::Home, transitions);

        let result = store.submit_if(Nav::OpenList, || false);

        assert!(matches!(result, Err(FsmError::TaskCancelled { .. })));
        assert_eq!(store.current_state(), Page::Home);
    }

    #[test]
    fn store_restores_from_keeper() {
        let keeper = Arc::new(InMemoryStateKeeper::new());
        let first = store_with(&Arc::new(Recorder::default()), Some(keeper.clone()));
        first.submit(Nav::OpenList).unwrap();
        first.submit(Nav::OpenItem(9)).unwrap();

        let recorder = Arc::new(Recorder::default());
        let second = store_with(&recorder, Some(keeper));

        assert_eq!(second.current_state(), Page::Item { id: 9 });
        assert_eq!(second.current().id, 2);
        assert_eq!(
            *recorder.events.lock(),
            vec![(true, 0), (true, 1), (true, 2)]
        );

        second.submit(Nav::Home).unwrap();
        assert_eq!(second.current().id, 3);
    }
}
