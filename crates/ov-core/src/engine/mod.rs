//! Query transition engine
//!
//! Every operation takes the current state by reference and returns a new
//! one. The input is cloned once on entry and only that private copy is
//! modified, so states handed out earlier never change.

mod action;

pub use action::Action;

use ov_model::PackageModel;
use ov_views::{VisualizationRegistry, VisualizationType};
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::navigation::{next_dimension, update_source_target};
use crate::params::{self, NormalizedParams, QueryDefaults, RawParams, ValidatedParams};
use crate::state::{push_unique, Axis, Breadcrumb, OrderBy, QueryState, SortDirection};

/// Applies user actions to query states of one package
pub struct QueryEngine<'a> {
    model: &'a PackageModel,
    registry: &'a dyn VisualizationRegistry,
    config: EngineConfig,
}

impl<'a> QueryEngine<'a> {
    /// Create an engine with the default configuration
    pub fn new(model: &'a PackageModel, registry: &'a dyn VisualizationRegistry) -> Self {
        Self {
            model,
            registry,
            config: EngineConfig::default(),
        }
    }

    /// Replace the configuration
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn model(&self) -> &'a PackageModel {
        self.model
    }

    pub fn registry(&self) -> &'a dyn VisualizationRegistry {
        self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Coerce a raw parameter bag into query-field shapes
    pub fn normalize(&self, raw: &RawParams) -> NormalizedParams {
        params::normalize(raw, &self.config)
    }

    /// Apply visualization-type defaults to normalized parameters
    pub fn validate(&self, normalized: NormalizedParams) -> ValidatedParams {
        params::validate(normalized, self.model, self.registry, &self.config)
    }

    /// State with package identity filled in and every query field empty
    pub fn empty_state(&self) -> QueryState {
        QueryState::new(
            self.model.id(),
            self.model.country_code().map(str::to_string),
            self.model.first_date_time_dimension().key.clone(),
            self.config.default_lang.clone(),
        )
    }

    /// Build the initial state from optional external parameters
    pub fn init(&self, raw: Option<&RawParams>) -> QueryState {
        let raw = raw.cloned().unwrap_or_default();
        let validated = self.validate(self.normalize(&raw));

        let mut state = self.empty_state();
        validated.apply_to(&mut state);
        state
    }

    /// Type of the first active visualization
    pub fn active_type(&self, state: &QueryState) -> Option<VisualizationType> {
        state
            .visualizations
            .first()
            .and_then(|id| self.registry.visualization_type(id))
    }

    /// Whether `axis` holds at most one dimension in `state`
    pub fn is_single_select(&self, state: &QueryState, axis: Axis) -> bool {
        match axis {
            Axis::Groups => true,
            Axis::Series => self.active_type(state) == Some(VisualizationType::TimeSeries),
            Axis::Rows | Axis::Columns => false,
        }
    }

    /// Apply one action
    pub fn apply(&self, state: &QueryState, action: &Action) -> QueryState {
        tracing::trace!("Applying {:?}", action);

        match action {
            Action::ChangeMeasure { measure } => self.change_measure(state, measure),
            Action::ChangeFilter { filter, value } => self.change_filter(state, filter, value),
            Action::ClearFilter { filter, value } => {
                self.clear_filter(state, filter, value.as_deref())
            }
            Action::ClearFilters => self.clear_filters(state),
            Action::ChangeDimension { axis, dimension } => {
                self.change_dimension(state, *axis, dimension)
            }
            Action::ClearDimension { axis, dimension } => {
                self.clear_dimension(state, *axis, dimension)
            }
            Action::ClearDimensions { axis } => self.clear_dimensions(state, *axis),
            Action::DrillDown { value } => self.drill_down(state, value),
            Action::ApplyBreadcrumb { breadcrumb } => self.apply_breadcrumb(state, breadcrumb),
            Action::ChangeOrderBy { key, direction } => {
                self.change_order_by(state, key, direction)
            }
            Action::AddVisualization { id, toggle } => self.add_visualization(state, id, *toggle),
            Action::RemoveVisualization { id } => self.remove_visualization(state, id),
            Action::RemoveAllVisualizations => self.remove_all_visualizations(state),
            Action::UpdateFromParams { params } => self.update_from_params(state, params),
        }
    }

    /// Select a single measure, keeping a measure ordering meaningful
    pub fn change_measure(&self, state: &QueryState, measure: &str) -> QueryState {
        let mut result = state.clone();

        let order_by_is_measure = result
            .order_by
            .as_ref()
            .map_or(false, |o| result.measures.contains(&o.key));

        result.measures = vec![measure.to_string()];
        if order_by_is_measure {
            result.order_by = Some(OrderBy::new(measure, self.config.default_order_direction));
        }

        result
    }

    /// Add `value` to a filter, moving it to the end if already present
    pub fn change_filter(&self, state: &QueryState, filter: &str, value: &str) -> QueryState {
        let mut result = state.clone();
        push_unique(result.filters.entry(filter.to_string()).or_default(), value);
        result
    }

    /// Remove one value from a filter, or the whole filter if `value` is `None`
    pub fn clear_filter(&self, state: &QueryState, filter: &str, value: Option<&str>) -> QueryState {
        let mut result = state.clone();

        match value {
            None => {
                result.filters.shift_remove(filter);
            }
            Some(value) => {
                let now_empty = match result.filters.get_mut(filter) {
                    Some(values) => {
                        values.retain(|v| v != value);
                        values.is_empty()
                    }
                    None => false,
                };
                if now_empty {
                    result.filters.shift_remove(filter);
                }
            }
        }

        result
    }

    pub fn clear_filters(&self, state: &QueryState) -> QueryState {
        let mut result = state.clone();
        result.filters.clear();
        result
    }

    /// Put a dimension on an axis
    ///
    /// Single-select axes are replaced; multi-select axes get the dimension
    /// appended (moved to the end if already there).
    pub fn change_dimension(&self, state: &QueryState, axis: Axis, dimension: &str) -> QueryState {
        let mut result = state.clone();

        if self.is_single_select(state, axis) {
            let order_by_is_group = axis == Axis::Groups
                && result
                    .order_by
                    .as_ref()
                    .map_or(false, |o| result.groups.contains(&o.key));

            *result.axis_mut(axis) = vec![dimension.to_string()];
            if order_by_is_group {
                result.order_by =
                    Some(OrderBy::new(dimension, self.config.default_order_direction));
            }
        } else {
            push_unique(result.axis_mut(axis), dimension);
        }

        if axis == Axis::Groups {
            update_source_target(&mut result, self.model);
        }

        result
    }

    /// Remove a dimension from an axis
    pub fn clear_dimension(&self, state: &QueryState, axis: Axis, dimension: &str) -> QueryState {
        let mut result = state.clone();
        result.axis_mut(axis).retain(|d| d != dimension);

        if axis == Axis::Groups {
            update_source_target(&mut result, self.model);
        }

        result
    }

    /// Empty an axis
    pub fn clear_dimensions(&self, state: &QueryState, axis: Axis) -> QueryState {
        let mut result = state.clone();
        result.axis_mut(axis).clear();

        if axis == Axis::Groups {
            result.source = None;
            result.target = None;
        }

        result
    }

    /// Filter the current group by `value` and group by the next dimension
    ///
    /// At the bottom of a hierarchy, or for a group outside every hierarchy,
    /// grouping and filters are left as they are.
    pub fn drill_down(&self, state: &QueryState, value: &str) -> QueryState {
        let mut result = state.clone();

        let step = state.group().and_then(|group| {
            next_dimension(group, self.model).map(|next| (group.to_string(), next.key.clone()))
        });

        match step {
            Some((group, next)) => {
                result
                    .filters
                    .entry(group)
                    .or_default()
                    .push(value.to_string());
                result.groups = vec![next];
            }
            None => debug!("Nothing to drill down to from {:?}", state.group()),
        }

        update_source_target(&mut result, self.model);
        result
    }

    /// Restore the grouping and filters of an earlier drill-down step
    pub fn apply_breadcrumb(&self, state: &QueryState, breadcrumb: &Breadcrumb) -> QueryState {
        let mut result = state.clone();
        result.groups = breadcrumb.groups.clone();
        result.filters = breadcrumb.filters.clone();

        update_source_target(&mut result, self.model);
        result
    }

    /// Order by `key`; `direction` is descending only if it reads `desc`
    pub fn change_order_by(&self, state: &QueryState, key: &str, direction: &str) -> QueryState {
        let mut result = state.clone();
        result.order_by = Some(OrderBy::new(key, SortDirection::parse_lenient(direction)));
        result
    }

    /// Add a visualization, or remove it when `toggle` is set and it is shown
    ///
    /// Adding a visualization of another type than the active one replaces
    /// the whole selection. When the selection changes to exactly one
    /// visualization its type defaults are applied; when it becomes empty
    /// the query is cleared.
    pub fn add_visualization(&self, state: &QueryState, id: &str, toggle: bool) -> QueryState {
        let mut result = state.clone();
        let already_added = result.visualizations.iter().any(|v| v == id);

        if already_added {
            if !toggle {
                return result;
            }
            result.visualizations.retain(|v| v != id);
        } else {
            let Some(visualization_type) = self.registry.visualization_type(id) else {
                warn!("Ignoring unknown visualization '{}'", id);
                return result;
            };
            if matches!(self.active_type(&result), Some(active) if active != visualization_type) {
                debug!(
                    "Switching visualizations to type {}, resetting query",
                    visualization_type
                );
                result.clear_query();
            }
            result.visualizations.push(id.to_string());
        }

        match result.visualizations.len() {
            0 => result.clear_query(),
            1 => self.apply_type_defaults(&mut result),
            _ => {}
        }

        result
    }

    /// Remove a visualization; clears the query when none is left
    pub fn remove_visualization(&self, state: &QueryState, id: &str) -> QueryState {
        let mut result = state.clone();
        result.visualizations.retain(|v| v != id);

        if result.visualizations.is_empty() {
            result.clear_query();
        }

        result
    }

    pub fn remove_all_visualizations(&self, state: &QueryState) -> QueryState {
        let mut result = state.clone();
        result.clear_query();
        result
    }

    /// Re-derive the query from an externally changed parameter bag
    ///
    /// Fields not covered by the parameters fall back to empty values, not
    /// to the previous state.
    pub fn update_from_params(&self, state: &QueryState, raw: &RawParams) -> QueryState {
        let validated = self.validate(self.normalize(raw));

        let mut result = state.clone();
        result.reset_to_defaults(&self.config.default_lang);
        validated.apply_to(&mut result);

        update_source_target(&mut result, self.model);
        result
    }

    /// Overwrite the fields the active type defines with its defaults
    fn apply_type_defaults(&self, state: &mut QueryState) {
        let Some(visualization_type) = self.active_type(state) else {
            warn!("No registered visualization among {:?}", state.visualizations);
            return;
        };

        let defaults = QueryDefaults::for_type(visualization_type, self.model, &self.config);
        state.measures = defaults.measures;
        if let Some(groups) = defaults.groups {
            state.groups = groups;
        }
        if let Some(series) = defaults.series {
            state.series = series;
        }
        if let Some(rows) = defaults.rows {
            state.rows = rows;
        }
        if let Some(columns) = defaults.columns {
            state.columns = columns;
        }
        state.order_by = defaults.order_by;

        update_source_target(state, self.model);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::package_model;
    use ov_views::Catalog;

    fn with_engine<R>(f: impl FnOnce(&QueryEngine<'_>) -> R) -> R {
        let model = package_model();
        let engine = QueryEngine::new(&model, Catalog::builtin());
        f(&engine)
    }

    fn treemap_state(engine: &QueryEngine<'_>) -> QueryState {
        engine.init(Some(&RawParams::new().with_visualizations("Treemap")))
    }

    #[test]
    fn test_init_without_params() {
        with_engine(|engine| {
            let state = engine.init(None);

            assert_eq!(state.package_id, "budget-2016");
            assert_eq!(state.country_code.as_deref(), Some("DE"));
            assert_eq!(state.date_time_dimension, "year");
            assert_eq!(state.lang, "en");
            assert!(state.measures.is_empty());
            assert!(state.visualizations.is_empty());
            assert!(state.order_by.is_none());
        });
    }

    #[test]
    fn test_init_with_visualization() {
        with_engine(|engine| {
            let state = treemap_state(engine);

            assert_eq!(state.measures, vec!["amount"]);
            assert_eq!(state.groups, vec!["region"]);
            assert_eq!(state.source.as_deref(), Some("region"));
            assert_eq!(state.target.as_deref(), Some("country"));
            assert!(state.check_invariants(engine.registry()).is_ok());
        });
    }

    #[test]
    fn test_change_measure_rewrites_measure_ordering() {
        with_engine(|engine| {
            let state = treemap_state(engine);
            let state = engine.change_order_by(&state, "amount", "asc");

            let changed = engine.change_measure(&state, "revenue");
            assert_eq!(changed.measures, vec!["revenue"]);
            assert_eq!(
                changed.order_by,
                Some(OrderBy::new("revenue", SortDirection::Desc))
            );
        });
    }

    #[test]
    fn test_change_measure_keeps_dimension_ordering() {
        with_engine(|engine| {
            let state = engine.change_order_by(&treemap_state(engine), "region", "asc");

            let changed = engine.change_measure(&state, "revenue");
            assert_eq!(
                changed.order_by,
                Some(OrderBy::new("region", SortDirection::Asc))
            );
        });
    }

    #[test]
    fn test_change_filter_twice_keeps_one_occurrence() {
        with_engine(|engine| {
            let state = treemap_state(engine);
            let once = engine.change_filter(&state, "region", "EU");
            let once = engine.change_filter(&once, "region", "ASIA");
            let twice = engine.change_filter(&once, "region", "EU");

            assert_eq!(twice.filters["region"], vec!["ASIA", "EU"]);
            assert!(state.filters.is_empty());
        });
    }

    #[test]
    fn test_clear_filter_is_idempotent() {
        with_engine(|engine| {
            let state = engine.change_filter(&treemap_state(engine), "region", "EU");
            let state = engine.change_filter(&state, "year", "2016");

            let once = engine.clear_filter(&state, "region", None);
            let twice = engine.clear_filter(&once, "region", None);
            assert_eq!(once, twice);
            assert!(!once.filters.contains_key("region"));
            assert!(once.filters.contains_key("year"));
        });
    }

    #[test]
    fn test_clear_filter_value_removes_empty_key() {
        with_engine(|engine| {
            let state = engine.change_filter(&treemap_state(engine), "region", "EU");
            let state = engine.change_filter(&state, "region", "ASIA");

            let state = engine.clear_filter(&state, "region", Some("EU"));
            assert_eq!(state.filters["region"], vec!["ASIA"]);

            let state = engine.clear_filter(&state, "region", Some("ASIA"));
            assert!(state.filters.is_empty());

            let state = engine.clear_filter(&state, "missing", Some("x"));
            assert!(state.filters.is_empty());
        });
    }

    #[test]
    fn test_clear_filters() {
        with_engine(|engine| {
            let state = engine.change_filter(&treemap_state(engine), "region", "EU");
            assert!(engine.clear_filters(&state).filters.is_empty());
            assert_eq!(state.filters.len(), 1);
        });
    }

    #[test]
    fn test_change_group_is_single_select() {
        with_engine(|engine| {
            let state = engine.change_order_by(&treemap_state(engine), "region", "asc");

            let changed = engine.change_dimension(&state, Axis::Groups, "country");
            assert_eq!(changed.groups, vec!["country"]);
            assert_eq!(
                changed.order_by,
                Some(OrderBy::new("country", SortDirection::Desc))
            );
            assert_eq!(changed.source.as_deref(), Some("country"));
            assert_eq!(changed.target.as_deref(), Some("city"));
        });
    }

    #[test]
    fn test_change_group_keeps_measure_ordering() {
        with_engine(|engine| {
            let changed = engine.change_dimension(&treemap_state(engine), Axis::Groups, "program");
            assert_eq!(
                changed.order_by,
                Some(OrderBy::new("amount", SortDirection::Desc))
            );
            assert_eq!(changed.source.as_deref(), Some("program"));
            assert_eq!(changed.target.as_deref(), Some("program"));
        });
    }

    #[test]
    fn test_multi_select_axis_toggles_append() {
        with_engine(|engine| {
            let state = engine.init(Some(&RawParams::new().with_visualizations("PivotTable")));

            let state = engine.change_dimension(&state, Axis::Rows, "program");
            assert_eq!(state.rows, vec!["region", "program"]);

            let state = engine.change_dimension(&state, Axis::Rows, "region");
            assert_eq!(state.rows, vec!["program", "region"]);
        });
    }

    #[test]
    fn test_series_single_select_for_time_series() {
        with_engine(|engine| {
            let state = engine.init(Some(&RawParams::new().with_visualizations("LineChart")));
            let state = engine.change_dimension(&state, Axis::Series, "region");
            let state = engine.change_dimension(&state, Axis::Series, "program");

            assert_eq!(state.series, vec!["program"]);
            assert!(state.check_invariants(engine.registry()).is_ok());

            let state = engine.init(Some(&RawParams::new().with_visualizations("Sankey")));
            let state = engine.change_dimension(&state, Axis::Series, "region");
            let state = engine.change_dimension(&state, Axis::Series, "program");
            assert_eq!(state.series, vec!["region", "program"]);
        });
    }

    #[test]
    fn test_clear_dimension() {
        with_engine(|engine| {
            let state = treemap_state(engine);

            let cleared = engine.clear_dimension(&state, Axis::Groups, "region");
            assert!(cleared.groups.is_empty());
            assert!(cleared.source.is_none());
            assert!(cleared.target.is_none());

            let untouched = engine.clear_dimension(&state, Axis::Groups, "city");
            assert_eq!(untouched.groups, vec!["region"]);
            assert_eq!(untouched.source.as_deref(), Some("region"));
        });
    }

    #[test]
    fn test_clear_dimensions() {
        with_engine(|engine| {
            let state = engine.init(Some(&RawParams::new().with_visualizations("PivotTable")));
            let state = engine.change_dimension(&state, Axis::Columns, "program");

            let cleared = engine.clear_dimensions(&state, Axis::Columns);
            assert!(cleared.columns.is_empty());
            assert_eq!(cleared.rows, vec!["region"]);

            let cleared = engine.clear_dimensions(&treemap_state(engine), Axis::Groups);
            assert!(cleared.groups.is_empty());
            assert!(cleared.source.is_none() && cleared.target.is_none());
        });
    }

    #[test]
    fn test_drill_down_example() {
        with_engine(|engine| {
            let state = treemap_state(engine);
            let drilled = engine.drill_down(&state, "EU");

            assert_eq!(drilled.groups, vec!["country"]);
            assert_eq!(drilled.filters["region"], vec!["EU"]);
            assert_eq!(drilled.source.as_deref(), Some("country"));
            assert_eq!(drilled.target.as_deref(), Some("city"));

            let bottom = engine.drill_down(&drilled, "DE");
            assert_eq!(bottom.groups, vec!["city"]);
            assert_eq!(bottom.source.as_deref(), Some("country"));
            assert_eq!(bottom.target.as_deref(), Some("city"));
        });
    }

    #[test]
    fn test_drill_down_from_source_target_perspective() {
        with_engine(|engine| {
            let state = engine.change_dimension(&treemap_state(engine), Axis::Groups, "region");
            let drilled = engine.drill_down(&state, "EU");

            assert_eq!(drilled.groups, vec!["country"]);
            assert_eq!(drilled.filters.len(), 1);
        });
    }

    #[test]
    fn test_drill_down_at_last_dimension_is_noop() {
        with_engine(|engine| {
            let state = engine.change_dimension(&treemap_state(engine), Axis::Groups, "city");
            let drilled = engine.drill_down(&state, "Berlin");

            assert_eq!(drilled.groups, vec!["city"]);
            assert!(drilled.filters.is_empty());
            assert_eq!(drilled.source.as_deref(), Some("country"));
            assert_eq!(drilled.target.as_deref(), Some("city"));
        });
    }

    #[test]
    fn test_drill_down_outside_hierarchy() {
        with_engine(|engine| {
            let state = engine.init(Some(&RawParams::new().with_visualizations("Map")));
            let drilled = engine.drill_down(&state, "DE");

            assert_eq!(drilled.groups, vec!["admin0"]);
            assert!(drilled.filters.is_empty());
            assert!(drilled.source.is_none());
        });
    }

    #[test]
    fn test_apply_breadcrumb_restores_path() {
        with_engine(|engine| {
            let start = treemap_state(engine);
            let crumb = Breadcrumb::from_state(&start);
            let drilled = engine.drill_down(&engine.drill_down(&start, "EU"), "DE");

            let restored = engine.apply_breadcrumb(&drilled, &crumb);
            assert_eq!(restored.groups, vec!["region"]);
            assert!(restored.filters.is_empty());
            assert_eq!(restored.source.as_deref(), Some("region"));
            assert_eq!(restored.target.as_deref(), Some("country"));
            assert_eq!(restored.measures, drilled.measures);
        });
    }

    #[test]
    fn test_change_order_by_direction() {
        with_engine(|engine| {
            let state = treemap_state(engine);

            let asc = engine.change_order_by(&state, "revenue", "ASC");
            assert_eq!(asc.order_by, Some(OrderBy::new("revenue", SortDirection::Asc)));

            let odd = engine.change_order_by(&state, "revenue", "xyz");
            assert_eq!(odd.order_by, Some(OrderBy::new("revenue", SortDirection::Asc)));

            let desc = engine.change_order_by(&state, "revenue", "Desc");
            assert_eq!(desc.order_by, Some(OrderBy::new("revenue", SortDirection::Desc)));
        });
    }

    #[test]
    fn test_add_first_visualization_initializes_defaults() {
        with_engine(|engine| {
            let state = engine.add_visualization(&engine.init(None), "PivotTable", false);

            assert_eq!(state.visualizations, vec!["PivotTable"]);
            assert_eq!(state.measures, vec!["amount"]);
            assert_eq!(state.rows, vec!["region"]);
            assert_eq!(state.columns, vec!["year"]);
            assert!(state.groups.is_empty());
        });
    }

    #[test]
    fn test_add_same_type_visualization_keeps_query() {
        with_engine(|engine| {
            let state = engine.change_measure(&treemap_state(engine), "revenue");
            let state = engine.add_visualization(&state, "BarChart", false);

            assert_eq!(state.visualizations, vec!["Treemap", "BarChart"]);
            assert_eq!(state.measures, vec!["revenue"]);
        });
    }

    #[test]
    fn test_add_present_visualization_without_toggle_is_noop() {
        with_engine(|engine| {
            let state = engine.change_measure(&treemap_state(engine), "revenue");
            assert_eq!(engine.add_visualization(&state, "Treemap", false), state);
        });
    }

    #[test]
    fn test_toggle_back_to_single_visualization_reinitializes() {
        with_engine(|engine| {
            let state = engine.add_visualization(&treemap_state(engine), "BarChart", false);
            let state = engine.change_measure(&state, "revenue");
            let state = engine.change_filter(&state, "region", "EU");

            let state = engine.add_visualization(&state, "Treemap", true);
            assert_eq!(state.visualizations, vec!["BarChart"]);
            assert_eq!(state.measures, vec!["amount"]);
            assert_eq!(state.filters["region"], vec!["EU"]);
        });
    }

    #[test]
    fn test_toggle_off_last_visualization_clears_query() {
        with_engine(|engine| {
            let state = engine.change_filter(&treemap_state(engine), "region", "EU");
            let state = engine.add_visualization(&state, "Treemap", true);

            assert!(state.visualizations.is_empty());
            assert!(state.measures.is_empty());
            assert!(state.groups.is_empty());
            assert!(state.filters.is_empty());
            assert!(state.order_by.is_none());
            assert!(state.source.is_none() && state.target.is_none());
            assert_eq!(state.package_id, "budget-2016");
        });
    }

    #[test]
    fn test_add_other_type_switches_visualizations() {
        with_engine(|engine| {
            let state = engine.change_filter(&treemap_state(engine), "region", "EU");
            let state = engine.add_visualization(&state, "LineChart", false);

            assert_eq!(state.visualizations, vec!["LineChart"]);
            assert!(state.groups.is_empty());
            assert!(state.filters.is_empty());
            assert!(state.order_by.is_none());
            assert!(state.check_invariants(engine.registry()).is_ok());
        });
    }

    #[test]
    fn test_add_unknown_visualization_is_ignored() {
        with_engine(|engine| {
            let state = treemap_state(engine);
            assert_eq!(engine.add_visualization(&state, "Ghost", false), state);
        });
    }

    #[test]
    fn test_remove_visualizations() {
        with_engine(|engine| {
            let state = engine.add_visualization(&treemap_state(engine), "BarChart", false);

            let one_left = engine.remove_visualization(&state, "Treemap");
            assert_eq!(one_left.visualizations, vec!["BarChart"]);
            assert_eq!(one_left.groups, vec!["region"]);

            let none_left = engine.remove_visualization(&one_left, "BarChart");
            assert!(none_left.measures.is_empty());
            assert!(none_left.order_by.is_none());

            let cleared = engine.remove_all_visualizations(&state);
            assert!(cleared.visualizations.is_empty());
            assert!(cleared.groups.is_empty());
        });
    }

    #[test]
    fn test_update_from_params_resets_stale_fields() {
        with_engine(|engine| {
            let pivot = engine.init(Some(&RawParams::new().with_visualizations("PivotTable")));
            let params = RawParams::new()
                .with_visualizations("Treemap")
                .with_groups("country")
                .with_filters(vec!["region|EU"]);

            let state = engine.update_from_params(&pivot, &params);
            assert_eq!(state.visualizations, vec!["Treemap"]);
            assert!(state.rows.is_empty());
            assert!(state.columns.is_empty());
            assert_eq!(state.groups, vec!["country"]);
            assert_eq!(state.filters["region"], vec!["EU"]);
            assert_eq!(state.source.as_deref(), Some("country"));
            assert_eq!(state.target.as_deref(), Some("city"));
            assert_eq!(state.package_id, pivot.package_id);
        });
    }

    #[test]
    fn test_update_from_empty_params_clears_query() {
        with_engine(|engine| {
            let state = engine.change_filter(&treemap_state(engine), "region", "EU");
            let state = engine.update_from_params(&state, &RawParams::new().with_lang("de"));

            assert_eq!(state.lang, "de");
            assert!(state.visualizations.is_empty());
            assert!(state.filters.is_empty());
            assert!(state.source.is_none());
        });
    }

    #[test]
    fn test_url_round_trip() {
        with_engine(|engine| {
            let state = treemap_state(engine);
            let state = engine.drill_down(&state, "EU");
            let state = engine.change_filter(&state, "region", "ASIA");
            let state = engine.change_order_by(&state, "country", "asc");

            let restored = engine.update_from_params(&engine.init(None), &state.to_params());
            assert_eq!(restored, state);
        });
    }

    #[test]
    fn test_url_round_trip_with_separator_in_values() {
        with_engine(|engine| {
            let state = treemap_state(engine);
            let state = engine.change_filter(&state, "region", "EU|EEA");
            let state = engine.change_filter(&state, "a|b", r"c\");
            let state = engine.change_order_by(&state, "x|y", "asc");

            let params = state.to_params();
            let restored = engine.update_from_params(&engine.init(None), &params);
            assert_eq!(restored.filters, state.filters);
            assert_eq!(restored.order_by, state.order_by);
            assert_eq!(restored, state);
        });
    }

    #[test]
    fn test_inputs_never_change() {
        with_engine(|engine| {
            let state = engine.change_filter(&treemap_state(engine), "region", "EU");
            let snapshot = state.clone();
            let crumb = Breadcrumb::default();

            let _ = engine.change_measure(&state, "revenue");
            let _ = engine.change_filter(&state, "region", "ASIA");
            let _ = engine.clear_filter(&state, "region", Some("EU"));
            let _ = engine.clear_filters(&state);
            let _ = engine.change_dimension(&state, Axis::Groups, "country");
            let _ = engine.clear_dimension(&state, Axis::Groups, "region");
            let _ = engine.clear_dimensions(&state, Axis::Groups);
            let _ = engine.drill_down(&state, "EU");
            let _ = engine.apply_breadcrumb(&state, &crumb);
            let _ = engine.change_order_by(&state, "amount", "asc");
            let _ = engine.add_visualization(&state, "Treemap", true);
            let _ = engine.remove_visualization(&state, "Treemap");
            let _ = engine.remove_all_visualizations(&state);
            let _ = engine.update_from_params(&state, &RawParams::new());

            assert_eq!(state, snapshot);
        });
    }

    #[test]
    fn test_configured_order_direction() {
        let model = package_model();
        let engine = QueryEngine::new(&model, Catalog::builtin()).with_config(EngineConfig {
            default_order_direction: SortDirection::Asc,
            ..EngineConfig::default()
        });

        let state = engine.init(Some(&RawParams::new().with_visualizations("Treemap")));
        assert_eq!(state.order_by, Some(OrderBy::new("amount", SortDirection::Asc)));
    }
}
