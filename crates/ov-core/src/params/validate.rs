//! Validation and defaulting of normalized parameters

use ov_model::PackageModel;
use ov_views::{VisualizationRegistry, VisualizationType};

use crate::config::EngineConfig;
use crate::navigation::resolve_source_target;
use crate::state::{Filters, OrderBy, QueryState};

use super::{NormalizedParams, QueryDefaults};

/// Query fields accepted for the active visualization type
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedQuery {
    pub visualization_type: VisualizationType,
    pub measures: Vec<String>,
    pub groups: Vec<String>,
    pub series: Vec<String>,
    pub rows: Vec<String>,
    pub columns: Vec<String>,
    pub filters: Filters,
    pub order_by: Option<OrderBy>,
    pub visualizations: Vec<String>,
    pub source: Option<String>,
    pub target: Option<String>,
}

/// Result of validation; `query` is `None` when no visualization resolved
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedParams {
    pub lang: String,
    pub query: Option<ValidatedQuery>,
}

impl ValidatedParams {
    /// Write the validated fields over `state`
    pub fn apply_to(self, state: &mut QueryState) {
        state.lang = self.lang;
        if let Some(query) = self.query {
            state.measures = query.measures;
            state.groups = query.groups;
            state.series = query.series;
            state.rows = query.rows;
            state.columns = query.columns;
            state.filters = query.filters;
            state.order_by = query.order_by;
            state.visualizations = query.visualizations;
            state.source = query.source;
            state.target = query.target;
        }
    }
}

/// Resolve visualizations, apply the type defaults and drop everything else
///
/// The first resolvable visualization decides the type. Supplied fields win
/// over defaults; fields the type does not use are discarded, and so are
/// visualizations of any other type.
pub fn validate(
    params: NormalizedParams,
    model: &PackageModel,
    registry: &dyn VisualizationRegistry,
    config: &EngineConfig,
) -> ValidatedParams {
    let resolved = registry.visualizations_by_ids(&params.visualizations);
    let Some(first) = resolved.first() else {
        return ValidatedParams {
            lang: params.lang,
            query: None,
        };
    };
    let visualization_type = first.visualization_type;

    let visualizations: Vec<String> = resolved
        .iter()
        .filter(|v| v.visualization_type == visualization_type)
        .map(|v| v.id.clone())
        .collect();
    if visualizations.len() < resolved.len() {
        tracing::debug!(
            "Dropped {} visualization(s) not of type {}",
            resolved.len() - visualizations.len(),
            visualization_type
        );
    }

    let defaults = QueryDefaults::for_type(visualization_type, model, config);

    let NormalizedParams {
        measures,
        groups,
        series,
        rows,
        columns,
        filters,
        order_by,
        lang,
        ..
    } = params;

    let groups = single_select(pick(groups, defaults.groups), "groups");
    let series = pick(series, defaults.series);
    let series = if visualization_type == VisualizationType::TimeSeries {
        single_select(series, "series")
    } else {
        series
    };
    let (source, target) = if visualization_type.tracks_hierarchy() {
        resolve_source_target(&groups, model)
    } else {
        (None, None)
    };

    ValidatedParams {
        lang,
        query: Some(ValidatedQuery {
            visualization_type,
            measures: measures.unwrap_or(defaults.measures),
            groups,
            series,
            rows: pick(rows, defaults.rows),
            columns: pick(columns, defaults.columns),
            filters: filters.unwrap_or_default(),
            order_by: order_by.or(defaults.order_by),
            visualizations,
            source,
            target,
        }),
    }
}

/// Supplied value if the type uses the field, otherwise nothing
fn pick(supplied: Option<Vec<String>>, default: Option<Vec<String>>) -> Vec<String> {
    match default {
        Some(default) => supplied.unwrap_or(default),
        None => Vec::new(),
    }
}

/// Keep only the first key of a single-select axis
fn single_select(mut keys: Vec<String>, axis: &str) -> Vec<String> {
    if keys.len() > 1 {
        tracing::debug!("Keeping only '{}' of {} {}", keys[0], keys.len(), axis);
        keys.truncate(1);
    }
    keys
}
