//! Package model for the query-state engine
//!
//! A package model is the read-only description of a dataset: its measures,
//! the hierarchies its dimensions are arranged in, and per-package metadata.
//! The model is validated once on construction so the rest of the system can
//! rely on its shape.

pub mod schema;

use thiserror::Error;

// Re-exports
pub use schema::{
    Dimension, DimensionValue, Hierarchy, HierarchyCollection, Measure, PackageDescriptor,
    PackageMeta, PackageModel,
};

/// Dimension type tag used by date/time dimensions
pub const DATETIME_DIMENSION_TYPE: &str = "datetime";

/// Errors that can occur while building a package model
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("package '{0}' declares no measures")]
    NoMeasures(String),

    #[error("package '{0}' declares no hierarchies")]
    NoHierarchies(String),

    #[error("package '{0}' declares no date/time hierarchy")]
    NoDateTimeHierarchy(String),

    #[error("{collection} hierarchy #{index} of package '{package}' has no dimensions")]
    EmptyHierarchy {
        package: String,
        collection: HierarchyCollection,
        index: usize,
    },
}
