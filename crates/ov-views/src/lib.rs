//! Visualization registry for the query-state engine
//!
//! Resolves visualization ids to their type. The query-state engine only ever
//! reads from a registry; where the list comes from (built-in catalog, JSON
//! file) is up to the caller.

mod registry;
mod visualization;

pub use registry::{Catalog, VisualizationRegistry};
pub use visualization::{Visualization, VisualizationType};

use thiserror::Error;

/// Errors that can occur while building a registry
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("duplicate visualization id '{0}'")]
    DuplicateId(String),
}
