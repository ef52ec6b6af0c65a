//! Visualization descriptors

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of a visualization; decides axis rules and query defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VisualizationType {
    /// Single grouping dimension, drillable (treemap, bar chart, ...)
    Drilldown,
    /// Drilldown plus a multi-select series axis
    SortableSeries,
    /// Plotted over the package's date/time dimension
    TimeSeries,
    /// Grouped by a location dimension (maps)
    Location,
    /// Rows by columns cross tabulation
    PivotTable,
}

impl VisualizationType {
    pub const ALL: [VisualizationType; 5] = [
        VisualizationType::Drilldown,
        VisualizationType::SortableSeries,
        VisualizationType::TimeSeries,
        VisualizationType::Location,
        VisualizationType::PivotTable,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VisualizationType::Drilldown => "drilldown",
            VisualizationType::SortableSeries => "sortable-series",
            VisualizationType::TimeSeries => "time-series",
            VisualizationType::Location => "location",
            VisualizationType::PivotTable => "pivot-table",
        }
    }

    /// Whether `source`/`target` are derived from the grouping for this type
    pub fn tracks_hierarchy(&self) -> bool {
        matches!(
            self,
            VisualizationType::Drilldown
                | VisualizationType::SortableSeries
                | VisualizationType::Location
        )
    }
}

impl fmt::Display for VisualizationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VisualizationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("Unknown visualization type '{}'", s))
    }
}

/// A visualization the dashboard can show
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visualization {
    pub id: String,

    #[serde(rename = "type")]
    pub visualization_type: VisualizationType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl Visualization {
    pub fn new(id: impl Into<String>, visualization_type: VisualizationType) -> Self {
        Self {
            id: id.into(),
            visualization_type,
            name: None,
            icon: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}
