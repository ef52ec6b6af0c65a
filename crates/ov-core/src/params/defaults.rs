//! Per-visualization-type query defaults

use ov_model::{Dimension, PackageModel};
use ov_views::VisualizationType;

use crate::config::EngineConfig;
use crate::state::OrderBy;

/// Default query fields for a visualization type
///
/// An axis that is `None` is not used by the type: validation discards
/// anything supplied for it.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryDefaults {
    pub visualization_type: VisualizationType,
    pub measures: Vec<String>,
    pub groups: Option<Vec<String>>,
    pub series: Option<Vec<String>>,
    pub rows: Option<Vec<String>>,
    pub columns: Option<Vec<String>>,
    pub order_by: Option<OrderBy>,
}

impl QueryDefaults {
    /// Build the defaults of `visualization_type` from the package model
    pub fn for_type(
        visualization_type: VisualizationType,
        model: &PackageModel,
        config: &EngineConfig,
    ) -> Self {
        let measure = model.first_measure().key.clone();
        let order_by = Some(OrderBy::new(
            measure.clone(),
            config.default_order_direction,
        ));

        let mut defaults = Self {
            visualization_type,
            measures: vec![measure],
            groups: None,
            series: None,
            rows: None,
            columns: None,
            order_by,
        };

        match visualization_type {
            VisualizationType::Drilldown => {
                defaults.groups = Some(vec![model.first_dimension().key.clone()]);
            }
            VisualizationType::SortableSeries => {
                defaults.groups = Some(vec![model.first_dimension().key.clone()]);
                defaults.series = Some(Vec::new());
            }
            VisualizationType::TimeSeries => {
                defaults.groups = Some(Vec::new());
                defaults.series = Some(Vec::new());
                defaults.order_by = None;
            }
            VisualizationType::Location => {
                defaults.groups = Some(key_list(model.first_location_dimension()));
            }
            VisualizationType::PivotTable => {
                defaults.rows = Some(vec![model.first_dimension().key.clone()]);
                defaults.columns = Some(key_list(choose_column_dimension(model)));
            }
        }

        defaults
    }

}

fn key_list(dimension: Option<&Dimension>) -> Vec<String> {
    dimension.map(|d| vec![d.key.clone()]).unwrap_or_default()
}

/// Column dimension for a pivot table
///
/// Prefers a date/time dimension with more than one value, looking at the
/// first date/time dimension of each column hierarchy in turn. Falls back to
/// the first dimension of the first column hierarchy.
pub fn choose_column_dimension(model: &PackageModel) -> Option<&Dimension> {
    let hierarchies = model.column_hierarchies();

    hierarchies
        .iter()
        .filter_map(|h| h.dimensions.iter().find(|d| d.is_datetime()))
        .find(|d| d.value_count() > 1)
        .or_else(|| hierarchies.first().and_then(|h| h.dimensions.first()))
}
