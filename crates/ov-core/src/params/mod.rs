//! External parameter bag and its conversion into query fields
//!
//! A raw parameter bag is what arrives from outside (typically a URL query
//! string already split into keys). It goes through two stages:
//! - `normalize`: coerce shapes (scalar vs list, `key|value` pairs)
//! - `validate`: resolve visualizations, apply type defaults, drop the rest

mod defaults;
mod normalize;
mod validate;

pub use defaults::{choose_column_dimension, QueryDefaults};
pub use normalize::{normalize, NormalizedParams};
pub use validate::{validate, ValidatedParams, ValidatedQuery};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Join two parts with `|`, escaping `|` and backslash inside them
pub(crate) fn join_pair(first: &str, second: &str) -> String {
    fn escape(part: &str) -> String {
        part.replace('\\', "\\\\").replace('|', "\\|")
    }
    format!("{}|{}", escape(first), escape(second))
}

/// Split on unescaped `|`, keeping the entry only if it has exactly two parts
///
/// A backslash escapes only a following `|` or backslash; elsewhere it is
/// taken literally.
pub(crate) fn split_pair(text: &str) -> Option<(String, String)> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' if matches!(chars.peek(), Some('|' | '\\')) => {
                current.extend(chars.next());
            }
            '|' => parts.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    parts.push(current);

    let [first, second]: [String; 2] = parts.try_into().ok()?;
    Some((first, second))
}

/// A value given either once or as a list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    /// Coerce to a list, dropping empty entries
    pub fn to_list(&self) -> Vec<String> {
        match self {
            OneOrMany::One(value) => vec![value.clone()],
            OneOrMany::Many(values) => values.clone(),
        }
        .into_iter()
        .filter(|v| !v.is_empty())
        .collect()
    }

    /// Whether the value counts as given at all (a lone empty string does not)
    pub fn is_present(&self) -> bool {
        match self {
            OneOrMany::One(value) => !value.is_empty(),
            OneOrMany::Many(_) => true,
        }
    }
}

impl From<&str> for OneOrMany {
    fn from(value: &str) -> Self {
        OneOrMany::One(value.to_string())
    }
}

impl From<Vec<String>> for OneOrMany {
    fn from(values: Vec<String>) -> Self {
        OneOrMany::Many(values)
    }
}

impl From<Vec<&str>> for OneOrMany {
    fn from(values: Vec<&str>) -> Self {
        OneOrMany::Many(values.into_iter().map(str::to_string).collect())
    }
}

/// Filters as found in a parameter bag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawFilters {
    /// `key|value` entries
    Pairs(OneOrMany),
    /// Already grouped by dimension key
    Map(IndexMap<String, OneOrMany>),
}

/// Flat, loosely typed parameters (e.g. from a URL)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measure: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<OneOrMany>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<OneOrMany>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<OneOrMany>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<OneOrMany>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<RawFilters>,

    /// `key|direction`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visualizations: Option<OneOrMany>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
}

impl RawParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_measure(mut self, measure: &str) -> Self {
        self.measure = Some(measure.to_string());
        self
    }

    pub fn with_groups(mut self, groups: impl Into<OneOrMany>) -> Self {
        self.groups = Some(groups.into());
        self
    }

    pub fn with_series(mut self, series: impl Into<OneOrMany>) -> Self {
        self.series = Some(series.into());
        self
    }

    pub fn with_filters(mut self, pairs: Vec<&str>) -> Self {
        self.filters = Some(RawFilters::Pairs(pairs.into()));
        self
    }

    pub fn with_order(mut self, order: &str) -> Self {
        self.order = Some(order.to_string());
        self
    }

    pub fn with_visualizations(mut self, visualizations: impl Into<OneOrMany>) -> Self {
        self.visualizations = Some(visualizations.into());
        self
    }

    pub fn with_lang(mut self, lang: &str) -> Self {
        self.lang = Some(lang.to_string());
        self
    }
}
