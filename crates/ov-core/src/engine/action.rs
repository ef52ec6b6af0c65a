//! User actions as data

use serde::{Deserialize, Serialize};

use crate::params::RawParams;
use crate::state::{Axis, Breadcrumb};

/// One user action, as recorded or replayed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    ChangeMeasure {
        measure: String,
    },
    ChangeFilter {
        filter: String,
        value: String,
    },
    ClearFilter {
        filter: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<String>,
    },
    ClearFilters,
    ChangeDimension {
        axis: Axis,
        dimension: String,
    },
    ClearDimension {
        axis: Axis,
        dimension: String,
    },
    ClearDimensions {
        axis: Axis,
    },
    DrillDown {
        value: String,
    },
    ApplyBreadcrumb {
        breadcrumb: Breadcrumb,
    },
    ChangeOrderBy {
        key: String,
        direction: String,
    },
    AddVisualization {
        id: String,
        #[serde(default)]
        toggle: bool,
    },
    RemoveVisualization {
        id: String,
    },
    RemoveAllVisualizations,
    UpdateFromParams {
        params: RawParams,
    },
}

impl Action {
    /// Whether the action may change the grouping outside of drill-down navigation
    pub fn resets_grouping(&self) -> bool {
        match self {
            Action::ChangeDimension { axis, .. }
            | Action::ClearDimension { axis, .. }
            | Action::ClearDimensions { axis } => *axis == Axis::Groups,
            Action::AddVisualization { .. }
            | Action::RemoveVisualization { .. }
            | Action::RemoveAllVisualizations
            | Action::UpdateFromParams { .. } => true,
            _ => false,
        }
    }
}
