//! Query session: the current state of one dashboard plus its listeners

mod subscriber;

pub use subscriber::QueryStateSubscriber;

use ov_model::PackageModel;
use ov_views::VisualizationRegistry;
use parking_lot::{ReentrantMutex, RwLock};
use std::sync::{Arc, Weak};

use crate::config::EngineConfig;
use crate::engine::{Action, QueryEngine};
use crate::params::RawParams;
use crate::state::{Breadcrumb, QueryState};

/// Session state stored internally
#[derive(Debug, Clone)]
struct SessionState {
    query: QueryState,
    /// Drill-down path, oldest step first
    breadcrumbs: Vec<Breadcrumb>,
}

/// Holds the current query state and applies actions to it
pub struct QuerySession {
    model: Arc<PackageModel>,
    registry: Arc<dyn VisualizationRegistry>,
    config: EngineConfig,
    state: Arc<RwLock<SessionState>>,
    subscribers: Arc<RwLock<Vec<Weak<dyn QueryStateSubscriber>>>>,
    /// Serializes dispatches so subscribers see states in dispatch order.
    /// Reentrant: a subscriber may dispatch from its callback.
    dispatching: ReentrantMutex<()>,
}

impl QuerySession {
    /// Create a session initialized from optional external parameters
    pub fn new(
        model: Arc<PackageModel>,
        registry: Arc<dyn VisualizationRegistry>,
        config: EngineConfig,
        params: Option<&RawParams>,
    ) -> Self {
        let query = QueryEngine::new(&model, registry.as_ref())
            .with_config(config.clone())
            .init(params);

        Self {
            model,
            registry,
            config,
            state: Arc::new(RwLock::new(SessionState {
                query,
                breadcrumbs: Vec::new(),
            })),
            subscribers: Arc::new(RwLock::new(Vec::new())),
            dispatching: ReentrantMutex::new(()),
        }
    }

    fn engine(&self) -> QueryEngine<'_> {
        QueryEngine::new(&self.model, self.registry.as_ref()).with_config(self.config.clone())
    }

    /// Current query state
    pub fn state(&self) -> QueryState {
        self.state.read().query.clone()
    }

    /// Drill-down path leading to the current state, oldest first
    pub fn breadcrumbs(&self) -> Vec<Breadcrumb> {
        self.state.read().breadcrumbs.clone()
    }

    pub fn model(&self) -> &PackageModel {
        &self.model
    }

    /// Apply an action and notify subscribers; returns the new state
    pub fn dispatch(&self, action: &Action) -> QueryState {
        let _dispatching = self.dispatching.lock();
        let engine = self.engine();
        let mut state = self.state.write();

        let next = engine.apply(&state.query, action);

        match action {
            Action::DrillDown { .. } => {
                if next.groups != state.query.groups {
                    let crumb = Breadcrumb::from_state(&state.query);
                    state.breadcrumbs.push(crumb);
                }
            }
            Action::ApplyBreadcrumb { breadcrumb } => {
                let keep = state
                    .breadcrumbs
                    .iter()
                    .position(|b| b == breadcrumb)
                    .unwrap_or(0);
                state.breadcrumbs.truncate(keep);
            }
            _ => {
                if action.resets_grouping() && next.groups != state.query.groups {
                    state.breadcrumbs.clear();
                }
            }
        }

        state.query = next.clone();
        drop(state);

        self.notify_subscribers(&next);
        next
    }

    /// Sync the session from an externally changed parameter bag
    pub fn update_from_params(&self, params: RawParams) -> QueryState {
        self.dispatch(&Action::UpdateFromParams { params })
    }

    /// Current state as a flat parameter bag
    pub fn to_params(&self) -> RawParams {
        self.state.read().query.to_params()
    }

    /// Add a subscriber
    pub fn add_subscriber(&self, subscriber: Arc<dyn QueryStateSubscriber>) {
        let mut subscribers = self.subscribers.write();
        subscribers.push(Arc::downgrade(&subscriber));
    }

    /// Notify all subscribers of a state change
    ///
    /// No lock is held while callbacks run, so subscribers may call back
    /// into the session.
    fn notify_subscribers(&self, state: &QueryState) {
        let live: Vec<Arc<dyn QueryStateSubscriber>> = {
            let mut subscribers = self.subscribers.write();

            // Remove any dead weak references
            subscribers.retain(|weak| weak.strong_count() > 0);
            subscribers.iter().filter_map(Weak::upgrade).collect()
        };

        for subscriber in live {
            subscriber.on_state_change(state);
        }
    }
}
