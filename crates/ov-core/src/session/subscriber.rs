//! Query state subscriber trait

use crate::state::QueryState;

/// Trait for components that need to respond to query state changes
pub trait QueryStateSubscriber: Send + Sync {
    /// Called after every dispatched action with the resulting state
    fn on_state_change(&self, state: &QueryState);
}
