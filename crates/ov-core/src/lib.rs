//! Query-state engine for the data exploration dashboard
//!
//! This crate owns the analytical query shown by the dashboard (measures,
//! axes, filters, ordering, active visualizations) and every transition on
//! it. Package models come from `ov-model`, visualization lookups from
//! `ov-views`.

pub mod config;
pub mod engine;
pub mod navigation;
pub mod params;
pub mod session;
pub mod state;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use config::{ConfigError, EngineConfig};
pub use engine::{Action, QueryEngine};
pub use navigation::{resolve_source_target, update_source_target};
pub use params::{
    normalize, validate, NormalizedParams, OneOrMany, RawFilters, RawParams, ValidatedParams,
};
pub use session::{QuerySession, QueryStateSubscriber};
pub use state::{
    Axis, Breadcrumb, Filters, InvariantViolation, OrderBy, QueryState, SortDirection,
};
