//! Shape normalization of raw parameters

use crate::config::EngineConfig;
use crate::state::{push_unique, Filters, OrderBy, SortDirection};

use super::{split_pair, OneOrMany, RawFilters, RawParams};

/// Parameters coerced into query-field shapes
///
/// `None` means the field was not given; validation then decides whether a
/// default applies.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedParams {
    pub measures: Option<Vec<String>>,
    pub groups: Option<Vec<String>>,
    pub series: Option<Vec<String>>,
    pub rows: Option<Vec<String>>,
    pub columns: Option<Vec<String>>,
    pub filters: Option<Filters>,
    pub order_by: Option<OrderBy>,
    pub visualizations: Vec<String>,
    pub lang: String,
}

/// Coerce a raw parameter bag into query-field shapes
pub fn normalize(raw: &RawParams, config: &EngineConfig) -> NormalizedParams {
    let axis = |value: &Option<OneOrMany>| {
        value
            .as_ref()
            .filter(|v| v.is_present())
            .map(OneOrMany::to_list)
    };

    NormalizedParams {
        measures: raw
            .measure
            .as_ref()
            .filter(|m| !m.is_empty())
            .map(|m| vec![m.clone()]),
        groups: axis(&raw.groups),
        series: axis(&raw.series),
        rows: axis(&raw.rows),
        columns: axis(&raw.columns),
        filters: raw.filters.as_ref().and_then(normalize_filters),
        order_by: raw.order.as_deref().and_then(parse_order),
        visualizations: raw
            .visualizations
            .as_ref()
            .map(OneOrMany::to_list)
            .unwrap_or_default(),
        lang: raw
            .lang
            .clone()
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| config.default_lang.clone()),
    }
}

fn parse_order(order: &str) -> Option<OrderBy> {
    if order.is_empty() {
        return None;
    }
    split_pair(order).map(|(key, direction)| {
        OrderBy::new(key, SortDirection::parse_lenient(&direction))
    })
}

fn normalize_filters(raw: &RawFilters) -> Option<Filters> {
    let mut filters = Filters::new();
    match raw {
        RawFilters::Pairs(pairs) => {
            if !pairs.is_present() {
                return None;
            }
            for entry in pairs.to_list() {
                match split_pair(&entry) {
                    Some((key, value)) => push_unique(filters.entry(key).or_default(), &value),
                    None => tracing::debug!("Dropping malformed filter entry '{}'", entry),
                }
            }
        }
        RawFilters::Map(map) => {
            for (key, values) in map {
                let values = values.to_list();
                if values.is_empty() {
                    continue;
                }
                let slot = filters.entry(key.clone()).or_default();
                for value in &values {
                    push_unique(slot, value);
                }
            }
        }
    }
    Some(filters)
}
