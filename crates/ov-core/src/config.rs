//! Engine configuration

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::state::SortDirection;

/// Errors that can occur while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Settings shared by every transition of an engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Language used when the parameters name none
    pub default_lang: String,

    /// Direction applied when an ordering is (re)initialized
    pub default_order_direction: SortDirection,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_lang: "en".to_string(),
            default_order_direction: SortDirection::Desc,
        }
    }
}

impl EngineConfig {
    /// Parse configuration from JSON text; missing fields take defaults
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read configuration from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}
