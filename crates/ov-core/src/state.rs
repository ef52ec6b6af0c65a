//! Query state: what the dashboard currently shows

use indexmap::IndexMap;
use ov_views::{VisualizationRegistry, VisualizationType};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::params::{join_pair, OneOrMany, RawFilters, RawParams};

/// Selected filter values per dimension key, in insertion order
pub type Filters = IndexMap<String, Vec<String>>;

/// A named slot holding selected dimension keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Groups,
    Series,
    Rows,
    Columns,
}

impl Axis {
    pub const ALL: [Axis; 4] = [Axis::Groups, Axis::Series, Axis::Rows, Axis::Columns];

    pub fn as_str(&self) -> &'static str {
        match self {
            Axis::Groups => "groups",
            Axis::Series => "series",
            Axis::Rows => "rows",
            Axis::Columns => "columns",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Axis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| format!("Unknown axis '{}'", s))
    }
}

/// Sort direction of the active ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// Case-insensitive `desc` is descending, anything else ascending
    pub fn parse_lenient(direction: &str) -> Self {
        if direction.eq_ignore_ascii_case("desc") {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordering by a measure or dimension key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub key: String,
    pub direction: SortDirection,
}

impl OrderBy {
    pub fn new(key: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            key: key.into(),
            direction,
        }
    }
}

/// Snapshot of a point in a drill-down path
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Breadcrumb {
    pub groups: Vec<String>,
    pub filters: Filters,
}

impl Breadcrumb {
    /// Capture the grouping and filters of a state
    pub fn from_state(state: &QueryState) -> Self {
        Self {
            groups: state.groups.clone(),
            filters: state.filters.clone(),
        }
    }
}

/// The analytical query shown by the dashboard
///
/// Values are never modified in place by the engine: every transition
/// returns a new state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryState {
    pub package_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,

    pub date_time_dimension: String,

    pub lang: String,

    #[serde(default)]
    pub measures: Vec<String>,

    #[serde(default)]
    pub groups: Vec<String>,

    #[serde(default)]
    pub series: Vec<String>,

    #[serde(default)]
    pub rows: Vec<String>,

    #[serde(default)]
    pub columns: Vec<String>,

    #[serde(default)]
    pub filters: Filters,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_by: Option<OrderBy>,

    #[serde(default)]
    pub visualizations: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

impl QueryState {
    /// Empty query for a package
    pub fn new(
        package_id: impl Into<String>,
        country_code: Option<String>,
        date_time_dimension: impl Into<String>,
        lang: impl Into<String>,
    ) -> Self {
        Self {
            package_id: package_id.into(),
            country_code,
            date_time_dimension: date_time_dimension.into(),
            lang: lang.into(),
            measures: Vec::new(),
            groups: Vec::new(),
            series: Vec::new(),
            rows: Vec::new(),
            columns: Vec::new(),
            filters: Filters::new(),
            order_by: None,
            visualizations: Vec::new(),
            source: None,
            target: None,
        }
    }

    pub(crate) fn axis_mut(&mut self, axis: Axis) -> &mut Vec<String> {
        match axis {
            Axis::Groups => &mut self.groups,
            Axis::Series => &mut self.series,
            Axis::Rows => &mut self.rows,
            Axis::Columns => &mut self.columns,
        }
    }

    /// The active grouping dimension
    pub fn group(&self) -> Option<&str> {
        self.groups.first().map(String::as_str)
    }

    /// The active measure
    pub fn measure(&self) -> Option<&str> {
        self.measures.first().map(String::as_str)
    }

    /// Drop every query field (no visualization is shown)
    pub(crate) fn clear_query(&mut self) {
        self.measures.clear();
        self.groups.clear();
        self.series.clear();
        self.rows.clear();
        self.columns.clear();
        self.source = None;
        self.target = None;
        self.filters.clear();
        self.order_by = None;
        self.visualizations.clear();
    }

    /// Reset query fields and language to the type-agnostic defaults
    ///
    /// `source`/`target` are left for the caller to recompute.
    pub(crate) fn reset_to_defaults(&mut self, default_lang: &str) {
        self.measures.clear();
        self.groups.clear();
        self.series.clear();
        self.rows.clear();
        self.columns.clear();
        self.filters.clear();
        self.order_by = None;
        self.visualizations.clear();
        self.lang = default_lang.to_string();
    }

    /// Flat parameter bag describing this state, suitable for a URL
    pub fn to_params(&self) -> RawParams {
        fn list(values: &[String]) -> Option<OneOrMany> {
            (!values.is_empty()).then(|| OneOrMany::Many(values.to_vec()))
        }

        let filters = (!self.filters.is_empty()).then(|| {
            let pairs = self
                .filters
                .iter()
                .flat_map(|(key, values)| values.iter().map(move |v| join_pair(key, v)))
                .collect();
            RawFilters::Pairs(OneOrMany::Many(pairs))
        });

        RawParams {
            measure: self.measures.first().cloned(),
            groups: list(&self.groups),
            series: list(&self.series),
            rows: list(&self.rows),
            columns: list(&self.columns),
            filters,
            order: self
                .order_by
                .as_ref()
                .map(|o| join_pair(&o.key, o.direction.as_str())),
            visualizations: list(&self.visualizations),
            lang: Some(self.lang.clone()),
        }
    }

    /// Check the structural invariants every engine-produced state keeps
    pub fn check_invariants(
        &self,
        registry: &dyn VisualizationRegistry,
    ) -> Result<(), InvariantViolation> {
        if self.measures.len() > 1 {
            return Err(InvariantViolation::MultipleMeasures(self.measures.len()));
        }
        if self.groups.len() > 1 {
            return Err(InvariantViolation::MultipleGroups(self.groups.len()));
        }

        let mut active_type: Option<VisualizationType> = None;
        for id in &self.visualizations {
            let visualization_type = registry
                .visualization_type(id)
                .ok_or_else(|| InvariantViolation::UnknownVisualization(id.clone()))?;
            match active_type {
                None => active_type = Some(visualization_type),
                Some(first) if first != visualization_type => {
                    return Err(InvariantViolation::MixedVisualizationTypes {
                        first,
                        other: visualization_type,
                    });
                }
                Some(_) => {}
            }
        }

        if active_type == Some(VisualizationType::TimeSeries) && self.series.len() > 1 {
            return Err(InvariantViolation::MultipleSeries(self.series.len()));
        }

        Ok(())
    }
}

/// A state that breaks one of the query invariants
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("{0} measures selected, at most one allowed")]
    MultipleMeasures(usize),

    #[error("{0} groups selected, at most one allowed")]
    MultipleGroups(usize),

    #[error("{0} series selected for a time series, at most one allowed")]
    MultipleSeries(usize),

    #[error("visualization '{0}' is not registered")]
    UnknownVisualization(String),

    #[error("visualization types {first} and {other} are mixed")]
    MixedVisualizationTypes {
        first: VisualizationType,
        other: VisualizationType,
    },
}

/// Move `value` to the end of `values`, keeping exactly one occurrence
pub(crate) fn push_unique(values: &mut Vec<String>, value: &str) {
    values.retain(|v| v != value);
    values.push(value.to_string());
}
