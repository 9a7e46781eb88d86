//! Chart theme: Plotly template and colour scales.

use orderlens_config::PresentationConfig;
use serde_json::{json, Value};

/// Plasma, sampled at ten stops.
const PLASMA: [&str; 10] = [
    "#0d0887", "#46039f", "#7201a8", "#9c179e", "#bd3786", "#d8576b", "#ed7953", "#fb9f3a",
    "#fdca26", "#f0f921",
];

/// Turbo, sampled at fifteen stops.
const TURBO: [&str; 15] = [
    "#30123b", "#4145ab", "#4675ed", "#39a2fc", "#1bcfd4", "#24eca6", "#61fc6c", "#a4fc3b",
    "#d1e834", "#f3c63a", "#fe9b2d", "#f36315", "#d93806", "#b11901", "#7a0402",
];

/// Red to blue diverging scale.
const RDBU: [&str; 11] = [
    "#67001f", "#b2182b", "#d6604d", "#f4a582", "#fddbc7", "#f7f7f7", "#d1e5f0", "#92c5de",
    "#4393c3", "#2166ac", "#053061",
];

const VIRIDIS: [&str; 10] = [
    "#440154", "#482878", "#3e4989", "#31688e", "#26828e", "#1f9e89", "#35b779", "#6ece58",
    "#b5de2b", "#fde725",
];

/// Qualitative palette for categorical series.
pub const BOLD: [&str; 11] = [
    "#7f3c8d", "#11a579", "#3969ac", "#f2b701", "#e73f74", "#80ba5a", "#e68310", "#008695",
    "#cf1c90", "#f97b72", "#a5aa99",
];

/// Accent colour for single-series line charts.
pub const ACCENT: &str = "#ed1b76";

/// Presentation settings handed to every report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub template: String,
    pub sequential_scale: String,
    pub diverging_scale: String,
    pub demographics_scale: String,
    pub width: u32,
    pub height: u32,
}

impl Theme {
    pub fn from_config(config: &PresentationConfig) -> Self {
        Self {
            template: config.template.clone(),
            sequential_scale: config.sequential_scale.clone(),
            diverging_scale: config.diverging_scale.clone(),
            demographics_scale: config.demographics_scale.clone(),
            width: config.width,
            height: config.height,
        }
    }

    /// Plotly.js template object for `layout.template`.
    ///
    /// Plotly.js has no registry of named templates, so the common names are
    /// expanded here; anything else falls back to the stock `plotly` look.
    pub fn template_value(&self) -> Value {
        let (paper, plot, grid, font) = match self.template.as_str() {
            "plotly_white" => ("white", "white", "#EBF0F8", "#2a3f5f"),
            "plotly_dark" => ("rgb(17,17,17)", "rgb(17,17,17)", "#283442", "#f2f5fa"),
            "simple_white" => ("white", "white", "rgba(0,0,0,0)", "rgb(36,36,36)"),
            "ggplot2" => ("white", "rgb(237,237,237)", "white", "rgb(51,51,51)"),
            _ => ("white", "#E5ECF6", "white", "#2a3f5f"),
        };
        json!({
            "layout": {
                "paper_bgcolor": paper,
                "plot_bgcolor": plot,
                "font": { "color": font },
                "xaxis": { "gridcolor": grid, "zerolinecolor": grid },
                "yaxis": { "gridcolor": grid, "zerolinecolor": grid },
                "geo": { "bgcolor": paper },
                "colorway": BOLD,
            }
        })
    }

    pub fn sequential(&self) -> Value {
        colorscale(&self.sequential_scale)
    }

    pub fn diverging(&self) -> Value {
        colorscale(&self.diverging_scale)
    }

    pub fn demographics(&self) -> Value {
        colorscale(&self.demographics_scale)
    }

    /// Colour for the `index`-th categorical series.
    pub fn categorical(index: usize) -> &'static str {
        BOLD[index % BOLD.len()]
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::from_config(&PresentationConfig::default())
    }
}

/// Resolves a colour scale name to a Plotly colorscale.
///
/// Known names become explicit `[stop, colour]` pairs and accept an `_r`
/// suffix for the reversed scale. Unknown names pass through for Plotly.js
/// to resolve.
pub fn colorscale(name: &str) -> Value {
    let (base, reversed) = match name.strip_suffix("_r") {
        Some(base) => (base, true),
        None => (name, false),
    };
    let colors: &[&str] = match base.to_ascii_lowercase().as_str() {
        "plasma" => &PLASMA,
        "turbo" => &TURBO,
        "rdbu" => &RDBU,
        "viridis" => &VIRIDIS,
        _ => return Value::String(name.to_string()),
    };

    let mut ordered: Vec<&str> = colors.to_vec();
    if reversed {
        ordered.reverse();
    }
    #[allow(clippy::cast_precision_loss)]
    let last = (ordered.len() - 1) as f64;
    #[allow(clippy::cast_precision_loss)]
    let stops: Vec<Value> = ordered
        .iter()
        .enumerate()
        .map(|(i, color)| json!([i as f64 / last, color]))
        .collect();
    Value::Array(stops)
}

/// Parses `#rrggbb`.
pub fn parse_hex(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(hex.get(range)?, 16).ok();
    Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}
