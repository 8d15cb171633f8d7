use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::views::markers::JoinKey;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("margins leave no room for the graph ({width}x{height})")]
    NoGraphArea { width: f64, height: f64 },
}

/// Outer size of the chart surface in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

impl Default for Dimensions {
    fn default() -> Self {
        Self {
            width: 400.0,
            height: 500.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: 40.0,
            right: 20.0,
            bottom: 50.0,
            left: 100.0,
        }
    }
}

/// Everything a chart needs to know that does not come from the data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Activity category to plot.
    pub activity: String,
    pub dimensions: Dimensions,
    pub margins: Margins,
    /// How point markers are matched to data across renders.
    pub join_key: JoinKey,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            activity: "cycling".to_string(),
            dimensions: Dimensions::default(),
            margins: Margins::default(),
            join_key: JoinKey::default(),
        }
    }
}

impl ChartConfig {
    pub fn with_activity(mut self, activity: impl Into<String>) -> Self {
        self.activity = activity.into();
        self
    }

    /// Parse and validate a JSON config; absent fields take defaults.
    pub fn from_json_slice(data: &[u8]) -> Result<Self, ConfigError> {
        let config: ChartConfig = serde_json::from_slice(data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_slice(&data)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let (width, height) = (self.graph_width(), self.graph_height());
        if width <= 0.0 || height <= 0.0 {
            return Err(ConfigError::NoGraphArea { width, height });
        }
        Ok(())
    }

    /// Width of the plotting area inside the margins.
    pub fn graph_width(&self) -> f64 {
        self.dimensions.width - self.margins.left - self.margins.right
    }

    /// Height of the plotting area inside the margins.
    pub fn graph_height(&self) -> f64 {
        self.dimensions.height - self.margins.top - self.margins.bottom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_graph_area() {
        let config = ChartConfig::default();
        assert_eq!(config.graph_width(), 280.0);
        assert_eq!(config.graph_height(), 410.0);
        assert_eq!(config.join_key, JoinKey::RecordId);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config =
            ChartConfig::from_json_slice(br#"{"activity": "running", "join_key": "position"}"#)
                .unwrap();
        assert_eq!(config.activity, "running");
        assert_eq!(config.join_key, JoinKey::Position);
        assert_eq!(config.dimensions, Dimensions::default());
    }

    #[test]
    fn rejects_margins_wider_than_chart() {
        let err = ChartConfig::from_json_slice(br#"{"dimensions": {"width": 100, "height": 500}}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::NoGraphArea { .. }));
    }

    #[test]
    fn partial_nested_objects_fill_defaults() {
        let config = ChartConfig::from_json_slice(
            br#"{"dimensions": {"width": 500}, "margins": {"left": 60}}"#,
        )
        .unwrap();
        assert_eq!(config.dimensions.width, 500.0);
        assert_eq!(config.dimensions.height, 500.0);
        assert_eq!(config.margins.left, 60.0);
        assert_eq!(config.margins.top, 40.0);
        assert_eq!(config.graph_width(), 420.0);
    }
}
