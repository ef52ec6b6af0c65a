//! Package schema: measures, dimensions and hierarchies

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::{ModelError, DATETIME_DIMENSION_TYPE};

/// A measure (aggregatable numeric field)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    pub key: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// A single known value of a dimension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionValue {
    pub key: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// A dimension that can be placed on an axis or filtered on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dimension {
    pub key: String,

    /// Free-form type tag, e.g. `datetime`
    #[serde(default)]
    pub dimension_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Known values, when the package enumerates them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<DimensionValue>>,
}

impl Dimension {
    /// Create a dimension without type or values
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            dimension_type: String::new(),
            label: None,
            values: None,
        }
    }

    /// Check whether this is a date/time dimension
    pub fn is_datetime(&self) -> bool {
        self.dimension_type == DATETIME_DIMENSION_TYPE
    }

    /// Number of enumerated values (0 when the package lists none)
    pub fn value_count(&self) -> usize {
        self.values.as_ref().map(Vec::len).unwrap_or(0)
    }
}

/// An ordered drill-down path, coarsest dimension first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hierarchy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    pub dimensions: Vec<Dimension>,
}

impl Hierarchy {
    /// Create an unnamed hierarchy from its dimensions
    pub fn new(dimensions: Vec<Dimension>) -> Self {
        Self {
            key: None,
            label: None,
            dimensions,
        }
    }

    /// Position of the dimension with the given key
    pub fn position(&self, key: &str) -> Option<usize> {
        self.dimensions.iter().position(|d| d.key == key)
    }

    /// Check if the hierarchy contains a dimension with the given key
    pub fn contains(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// The dimension following `key`, if `key` is present and not last
    pub fn next_after(&self, key: &str) -> Option<&Dimension> {
        self.position(key).and_then(|idx| self.dimensions.get(idx + 1))
    }
}

/// The four hierarchy collections of a package
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HierarchyCollection {
    General,
    DateTime,
    Location,
    Column,
}

impl fmt::Display for HierarchyCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HierarchyCollection::General => "general",
            HierarchyCollection::DateTime => "date/time",
            HierarchyCollection::Location => "location",
            HierarchyCollection::Column => "column",
        };
        f.write_str(name)
    }
}

/// Per-package metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Unvalidated package description, as delivered by the package API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageDescriptor {
    pub id: String,

    #[serde(default)]
    pub meta: PackageMeta,

    #[serde(default)]
    pub measures: Vec<Measure>,

    #[serde(default)]
    pub hierarchies: Vec<Hierarchy>,

    #[serde(default)]
    pub date_time_hierarchies: Vec<Hierarchy>,

    #[serde(default)]
    pub location_hierarchies: Vec<Hierarchy>,

    #[serde(default)]
    pub column_hierarchies: Vec<Hierarchy>,
}

/// Validated, read-only package model
///
/// Guarantees at least one measure, one general hierarchy and one date/time
/// hierarchy, and that no hierarchy is empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PackageDescriptor", into = "PackageDescriptor")]
pub struct PackageModel {
    inner: PackageDescriptor,
}

impl TryFrom<PackageDescriptor> for PackageModel {
    type Error = ModelError;

    fn try_from(descriptor: PackageDescriptor) -> Result<Self, Self::Error> {
        Self::new(descriptor)
    }
}

impl From<PackageModel> for PackageDescriptor {
    fn from(model: PackageModel) -> Self {
        model.inner
    }
}

impl PackageModel {
    /// Validate a descriptor and wrap it
    pub fn new(descriptor: PackageDescriptor) -> Result<Self, ModelError> {
        let id = descriptor.id.clone();

        if descriptor.measures.is_empty() {
            return Err(ModelError::NoMeasures(id));
        }
        if descriptor.hierarchies.is_empty() {
            return Err(ModelError::NoHierarchies(id));
        }
        if descriptor.date_time_hierarchies.is_empty() {
            return Err(ModelError::NoDateTimeHierarchy(id));
        }

        let collections = [
            (HierarchyCollection::General, &descriptor.hierarchies),
            (HierarchyCollection::DateTime, &descriptor.date_time_hierarchies),
            (HierarchyCollection::Location, &descriptor.location_hierarchies),
            (HierarchyCollection::Column, &descriptor.column_hierarchies),
        ];
        for (collection, hierarchies) in collections {
            if let Some(index) = hierarchies.iter().position(|h| h.dimensions.is_empty()) {
                return Err(ModelError::EmptyHierarchy {
                    package: id,
                    collection,
                    index,
                });
            }
        }

        tracing::debug!(
            "Loaded package '{}' with {} measures and {} hierarchies",
            id,
            descriptor.measures.len(),
            descriptor.hierarchies.len()
        );

        Ok(Self { inner: descriptor })
    }

    /// Parse and validate a package model from JSON text
    pub fn from_json_str(json: &str) -> Result<Self, ModelError> {
        let descriptor: PackageDescriptor = serde_json::from_str(json)?;
        Self::new(descriptor)
    }

    /// Read, parse and validate a package model from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn id(&self) -> &str {
        &self.inner.id
    }

    pub fn meta(&self) -> &PackageMeta {
        &self.inner.meta
    }

    pub fn country_code(&self) -> Option<&str> {
        self.inner.meta.country_code.as_deref()
    }

    pub fn measures(&self) -> &[Measure] {
        &self.inner.measures
    }

    pub fn hierarchies(&self) -> &[Hierarchy] {
        &self.inner.hierarchies
    }

    pub fn date_time_hierarchies(&self) -> &[Hierarchy] {
        &self.inner.date_time_hierarchies
    }

    pub fn location_hierarchies(&self) -> &[Hierarchy] {
        &self.inner.location_hierarchies
    }

    pub fn column_hierarchies(&self) -> &[Hierarchy] {
        &self.inner.column_hierarchies
    }

    /// First declared measure (always present)
    pub fn first_measure(&self) -> &Measure {
        &self.inner.measures[0]
    }

    /// First dimension of the first general hierarchy (always present)
    pub fn first_dimension(&self) -> &Dimension {
        &self.inner.hierarchies[0].dimensions[0]
    }

    /// First dimension of the first date/time hierarchy (always present)
    pub fn first_date_time_dimension(&self) -> &Dimension {
        &self.inner.date_time_hierarchies[0].dimensions[0]
    }

    /// First dimension of the first location hierarchy, if any
    pub fn first_location_dimension(&self) -> Option<&Dimension> {
        self.location_hierarchies()
            .first()
            .and_then(|h| h.dimensions.first())
    }

    /// First general hierarchy containing a dimension with the given key
    pub fn hierarchy_containing(&self, key: &str) -> Option<&Hierarchy> {
        self.hierarchies().iter().find(|h| h.contains(key))
    }
}
