//! Default values for every configuration section.

use crate::schema::*;
use orderlens_common::LoggingConfig;

/// Boundary geometry of the Brazilian states, keyed by `properties.sigla`.
pub const DEFAULT_GEOJSON_URL: &str =
    "https://raw.githubusercontent.com/codeforamerica/click_that_hood/master/public/data/brazil-states.geojson";

/// Plotly.js bundle referenced by generated pages.
pub const DEFAULT_PLOTLYJS_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

/// Placeholder for empty (state, month) pairs; keeps log axes defined.
pub const DEFAULT_SENTINEL: f64 = 1.0;

impl Default for Config {
    fn default() -> Self {
        Self {
            input: InputConfig::default(),
            output: OutputConfig::default(),
            geometry: GeometryConfig::default(),
            padding: PaddingConfig::default(),
            presentation: PresentationConfig::default(),
            reports: ReportsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: "data/merged_info_after_impute.parquet".to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: "assets".to_string(),
            plotlyjs_cdn: DEFAULT_PLOTLYJS_CDN.to_string(),
            display_mode_bar: false,
        }
    }
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url: DEFAULT_GEOJSON_URL.to_string(),
            feature_id_key: "properties.sigla".to_string(),
            timeout_seconds: 30,
        }
    }
}

impl Default for PaddingConfig {
    fn default() -> Self {
        Self {
            sentinel: DEFAULT_SENTINEL,
        }
    }
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            template: "plotly_white".to_string(),
            sequential_scale: "Plasma".to_string(),
            diverging_scale: "RdBu_r".to_string(),
            demographics_scale: "Turbo".to_string(),
            svg_snapshots: false,
            width: 1200,
            height: 700,
        }
    }
}
