//! Plotly figure model and the layout pieces shared across reports.

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::geometry::Geometry;
use crate::theme::Theme;

/// A Plotly figure: traces, layout and optional animation frames.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Figure {
    pub data: Vec<Value>,
    pub layout: Value,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub frames: Vec<Value>,
}

impl Figure {
    /// A figure with one trace and a themed, centred title.
    pub fn new(theme: &Theme, title: &str, trace: Value) -> Self {
        Self {
            data: vec![trace],
            layout: json!({
                "template": theme.template_value(),
                "title": { "text": title, "x": 0.5 },
                "autosize": true,
            }),
            frames: Vec::new(),
        }
    }

    /// Merges `patch` into the layout, one level of objects deep.
    pub fn update_layout(mut self, patch: Value) -> Self {
        merge(&mut self.layout, patch);
        self
    }

    pub fn with_frames(mut self, frames: Vec<Value>) -> Self {
        self.frames = frames;
        self
    }
}

fn merge(target: &mut Value, patch: Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                let nested = value.is_object() && target.get(&key).is_some_and(Value::is_object);
                if !nested {
                    target.insert(key, value);
                } else if let Some(existing) = target.get_mut(&key) {
                    merge(existing, value);
                }
            }
        }
        (target, patch) => *target = patch,
    }
}

/// Colour bar with a title on its right side.
pub fn colorbar(title: &str, x: Option<f64>) -> Value {
    let mut bar = Map::new();
    bar.insert(
        "title".into(),
        json!({ "text": title, "side": "right", "font": { "size": 12 } }),
    );
    if let Some(x) = x {
        bar.insert("x".into(), json!(x));
    }
    Value::Object(bar)
}

/// Map framing for the state choropleths.
pub fn choropleth_layout(scale: Value, colorbar_title: &str) -> Value {
    json!({
        "geo": {
            "visible": false,
            "fitbounds": "locations",
            "lataxis": { "range": [-38, 10] },
            "lonaxis": { "range": [-78, -30] },
        },
        "coloraxis": {
            "colorscale": scale,
            "colorbar": colorbar(colorbar_title, Some(0.85)),
        },
        "margin": { "r": 0, "t": 50, "l": 0, "b": 0 },
    })
}

/// A choropleth trace over state codes.
///
/// Without geometry the trace still carries its values; Plotly then draws an
/// empty map.
pub fn choropleth_trace(
    geometry: Option<&Geometry>,
    feature_id_key: &str,
    locations: Vec<String>,
    z: Vec<Option<f64>>,
    names: Vec<String>,
    customdata: Vec<Value>,
    hovertemplate: &str,
) -> Value {
    json!({
        "type": "choropleth",
        "geojson": geometry.map(Geometry::document),
        "featureidkey": feature_id_key,
        "locations": locations,
        "z": z,
        "hovertext": names,
        "customdata": customdata,
        "hovertemplate": hovertemplate,
        "coloraxis": "coloraxis",
    })
}

/// Slider and play controls for an animated figure with the given frames.
pub fn animation_controls(frame_names: &[String]) -> Value {
    let step = |name: &String| {
        json!({
            "label": name,
            "method": "animate",
            "args": [[name], {
                "mode": "immediate",
                "frame": { "duration": 300, "redraw": true },
                "transition": { "duration": 0 },
            }],
        })
    };
    json!({
        "sliders": [{
            "active": 0,
            "currentvalue": { "prefix": "", "font": { "size": 12 } },
            "pad": { "t": 60 },
            "steps": frame_names.iter().map(step).collect::<Vec<_>>(),
        }],
        "updatemenus": [{
            "type": "buttons",
            "direction": "left",
            "showactive": false,
            "x": 0.1,
            "y": 0,
            "xanchor": "right",
            "yanchor": "top",
            "pad": { "t": 60, "r": 10 },
            "buttons": [
                {
                    "label": "Play",
                    "method": "animate",
                    "args": [null, {
                        "mode": "immediate",
                        "fromcurrent": true,
                        "frame": { "duration": 500, "redraw": true },
                        "transition": { "duration": 300 },
                    }],
                },
                {
                    "label": "Pause",
                    "method": "animate",
                    "args": [[null], {
                        "mode": "immediate",
                        "frame": { "duration": 0, "redraw": false },
                        "transition": { "duration": 0 },
                    }],
                },
            ],
        }],
    })
}

/// Log-axis range (in decades) from `floor` up to `max`, padded by 5%.
pub fn log_axis_range(floor: f64, max: f64) -> [f64; 2] {
    let low = floor.max(f64::MIN_POSITIVE).log10();
    let high = if max > floor { max.log10() * 1.05 } else { low + 1.0 };
    [low, high.max(low + 0.1)]
}
