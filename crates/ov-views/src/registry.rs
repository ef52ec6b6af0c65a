//! Visualization lookup

use ahash::AHashMap;
use once_cell::sync::Lazy;
use std::path::Path;

use crate::{RegistryError, Visualization, VisualizationType};

/// Read-only lookup of visualizations by id
pub trait VisualizationRegistry: Send + Sync {
    /// Resolve a single id
    fn visualization_by_id(&self, id: &str) -> Option<&Visualization>;

    /// Resolve several ids, skipping unknown ones and keeping input order
    fn visualizations_by_ids(&self, ids: &[String]) -> Vec<&Visualization> {
        ids.iter()
            .filter_map(|id| self.visualization_by_id(id))
            .collect()
    }

    /// Type of the visualization with the given id
    fn visualization_type(&self, id: &str) -> Option<VisualizationType> {
        self.visualization_by_id(id).map(|v| v.visualization_type)
    }
}

static BUILTIN: Lazy<Catalog> = Lazy::new(|| {
    use VisualizationType::{Drilldown, Location, PivotTable, SortableSeries, TimeSeries};

    let entries = [
        ("Treemap", "Treemap", Drilldown),
        ("PieChart", "Pie Chart", Drilldown),
        ("BubbleTree", "Bubble Tree", Drilldown),
        ("BarChart", "Bar Chart", Drilldown),
        ("LineChart", "Line Chart", TimeSeries),
        ("Sankey", "Sankey", SortableSeries),
        ("Radar", "Radar", SortableSeries),
        ("Map", "Map", Location),
        ("PivotTable", "Pivot Table", PivotTable),
    ];

    let mut catalog = Catalog::new();
    for (id, name, visualization_type) in entries {
        catalog.insert_unchecked(Visualization::new(id, visualization_type).with_name(name));
    }
    catalog
});

/// In-memory registry backed by a list of visualizations
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    visualizations: Vec<Visualization>,
    index: AHashMap<String, usize>,
}

impl Catalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard set of dashboard visualizations
    pub fn builtin() -> &'static Catalog {
        &BUILTIN
    }

    /// Build a catalog, rejecting duplicate ids
    pub fn from_visualizations(
        visualizations: impl IntoIterator<Item = Visualization>,
    ) -> Result<Self, RegistryError> {
        let mut catalog = Self::new();
        for visualization in visualizations {
            catalog.insert(visualization)?;
        }
        tracing::debug!("Built catalog with {} visualizations", catalog.len());
        Ok(catalog)
    }

    /// Parse a catalog from a JSON list of visualizations
    pub fn from_json_str(json: &str) -> Result<Self, RegistryError> {
        let visualizations: Vec<Visualization> = serde_json::from_str(json)?;
        Self::from_visualizations(visualizations)
    }

    /// Read a catalog from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Add a visualization
    pub fn insert(&mut self, visualization: Visualization) -> Result<(), RegistryError> {
        if self.index.contains_key(&visualization.id) {
            return Err(RegistryError::DuplicateId(visualization.id));
        }
        self.insert_unchecked(visualization);
        Ok(())
    }

    fn insert_unchecked(&mut self, visualization: Visualization) {
        self.index
            .insert(visualization.id.clone(), self.visualizations.len());
        self.visualizations.push(visualization);
    }

    pub fn len(&self) -> usize {
        self.visualizations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visualizations.is_empty()
    }
}

impl VisualizationRegistry for Catalog {
    fn visualization_by_id(&self, id: &str) -> Option<&Visualization> {
        self.index.get(id).map(|&idx| &self.visualizations[idx])
    }
}
