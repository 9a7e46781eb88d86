//! Configuration schema definitions using serde with validation attributes.

use orderlens_common::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use validator::Validate;

/// Main configuration structure for OrderLens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Config {
    /// Source table location.
    #[validate]
    pub input: InputConfig,
    /// Where and how reports are written.
    #[validate]
    pub output: OutputConfig,
    /// Boundary geometry used by the choropleth reports.
    #[validate]
    pub geometry: GeometryConfig,
    /// Scaffolding of the animated state × month views.
    pub padding: PaddingConfig,
    /// Chart theme passed to the presenter.
    #[validate]
    pub presentation: PresentationConfig,
    /// Report selection.
    pub reports: ReportsConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Source table configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct InputConfig {
    /// Path to the order table (`.csv` or `.parquet`).
    #[validate(custom(function = "crate::validation::validate_path", message = "Input path is not a usable file path"))]
    pub path: String,
}

impl InputConfig {
    /// The input path as a filesystem path.
    pub fn path_buf(&self) -> PathBuf {
        PathBuf::from(&self.path)
    }
}

/// Report output configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving one HTML file per report; created if absent.
    #[validate(custom(function = "crate::validation::validate_path", message = "Output directory is not a usable path"))]
    pub directory: String,
    /// Plotly.js bundle URL referenced by every page.
    #[validate(custom(function = "crate::validation::validate_http_url", message = "Plotly.js URL must be an http(s) URL"))]
    pub plotlyjs_cdn: String,
    /// Whether the Plotly mode bar is shown.
    pub display_mode_bar: bool,
}

impl OutputConfig {
    /// The output directory as a filesystem path.
    pub fn directory_buf(&self) -> PathBuf {
        PathBuf::from(&self.directory)
    }
}

/// Boundary geometry (GeoJSON) configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct GeometryConfig {
    /// Whether to fetch the geometry at all; choropleths still render without it.
    pub enabled: bool,
    /// GeoJSON document URL.
    #[validate(custom(function = "crate::validation::validate_http_url", message = "GeoJSON URL must be an http(s) URL"))]
    pub url: String,
    /// Feature property path matched against state codes.
    #[validate(length(min = 1, message = "Feature id key cannot be empty"))]
    pub feature_id_key: String,
    /// Request timeout in seconds.
    #[validate(range(min = 1, max = 300, message = "Timeout must be between 1 and 300 seconds"))]
    pub timeout_seconds: u64,
}

/// Padding configuration for the animated views.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaddingConfig {
    /// Value substituted for (state, month) pairs with no data.
    ///
    /// Display-only: it keeps logarithmic axes defined and is never a
    /// reported metric.
    pub sentinel: f64,
}

/// Presentation theme configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct PresentationConfig {
    /// Plotly template name.
    #[validate(length(min = 1, message = "Template cannot be empty"))]
    pub template: String,
    /// Colour scale for count-like and sequential values.
    #[validate(length(min = 1, message = "Sequential scale cannot be empty"))]
    pub sequential_scale: String,
    /// Colour scale for signed or averaged values.
    #[validate(length(min = 1, message = "Diverging scale cannot be empty"))]
    pub diverging_scale: String,
    /// Colour scale for the customer demographics map and the late-delivery share chart.
    #[validate(length(min = 1, message = "Demographics scale cannot be empty"))]
    pub demographics_scale: String,
    /// Whether bar, histogram, and line reports also get a static SVG.
    pub svg_snapshots: bool,
    /// Snapshot width in pixels.
    #[validate(range(min = 100, max = 4000, message = "Width must be between 100 and 4000 pixels"))]
    pub width: u32,
    /// Snapshot height in pixels.
    #[validate(range(min = 100, max = 4000, message = "Height must be between 100 and 4000 pixels"))]
    pub height: u32,
}

/// Report selection.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportsConfig {
    /// Report ids to skip.
    pub disabled: Vec<String>,
}

impl ReportsConfig {
    /// Whether the report with the given id should run.
    pub fn is_enabled(&self, id: &str) -> bool {
        !self.disabled.iter().any(|d| d == id)
    }
}
