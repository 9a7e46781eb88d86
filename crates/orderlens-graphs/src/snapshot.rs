//! Static SVG snapshots of the bar, histogram and line reports.

use orderlens_common::{OrderLensError, Result};
use plotters::prelude::*;
use std::path::Path;
use tracing::debug;

use crate::theme::{parse_hex, Theme, ACCENT};

/// How the series is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotKind {
    Bar,
    Line,
}

/// A single categorical series, enough to redraw a chart without Plotly.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub kind: SnapshotKind,
    pub x_label: String,
    pub y_label: String,
    /// Category labels along the x axis.
    pub labels: Vec<String>,
    /// One value per label; gaps are skipped.
    pub values: Vec<Option<f64>>,
}

impl Snapshot {
    pub fn new(kind: SnapshotKind, x_label: &str, y_label: &str) -> Self {
        Self {
            kind,
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            labels: Vec::new(),
            values: Vec::new(),
        }
    }

    pub fn push(&mut self, label: impl Into<String>, value: Option<f64>) {
        self.labels.push(label.into());
        self.values.push(value);
    }

    #[allow(clippy::cast_precision_loss)]
    fn points(&self) -> Vec<(f64, f64)> {
        self.values
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.filter(|v| v.is_finite()).map(|v| (i as f64, v)))
            .collect()
    }

    /// Y range covering zero and every value, with headroom.
    fn value_range(&self) -> (f64, f64) {
        let points = self.points();
        let low = points.iter().map(|p| p.1).fold(0.0, f64::min);
        let high = points.iter().map(|p| p.1).fold(0.0, f64::max);
        if (high - low).abs() < f64::EPSILON {
            (low, low + 1.0)
        } else {
            (low * 1.1, high * 1.1)
        }
    }
}

fn draw_error<E>(e: E) -> OrderLensError
where
    E: std::error::Error + Send + Sync + 'static,
{
    OrderLensError::report_with_source("SVG rendering failed", e)
}

/// Draws `snapshot` to an SVG file sized by the theme.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn render_svg(snapshot: &Snapshot, title: &str, theme: &Theme, path: &Path) -> Result<()> {
    let root = SVGBackend::new(path, (theme.width, theme.height)).into_drawing_area();
    root.fill(&WHITE).map_err(draw_error)?;

    let (r, g, b) = parse_hex(ACCENT).unwrap_or((31, 119, 180));
    let color = RGBColor(r, g, b);
    let points = snapshot.points();
    let (y_min, y_max) = snapshot.value_range();
    #[allow(clippy::cast_precision_loss)]
    let x_max = snapshot.labels.len().max(1) as f64 - 0.5;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 22))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5f64..x_max, y_min..y_max)
        .map_err(draw_error)?;

    let labels = &snapshot.labels;
    let label_at = |x: &f64| {
        let index = x.round();
        if (x - index).abs() > 1e-6 || index < 0.0 {
            return String::new();
        }
        labels.get(index as usize).cloned().unwrap_or_default()
    };
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(snapshot.x_label.as_str())
        .y_desc(snapshot.y_label.as_str())
        .x_labels(labels.len().clamp(1, 24))
        .x_label_formatter(&label_at)
        .draw()
        .map_err(draw_error)?;

    match snapshot.kind {
        SnapshotKind::Bar => {
            chart
                .draw_series(points.iter().map(|&(x, v)| {
                    Rectangle::new([(x - 0.4, 0.0), (x + 0.4, v)], color.filled())
                }))
                .map_err(draw_error)?;
        }
        SnapshotKind::Line => {
            chart
                .draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))
                .map_err(draw_error)?;
            chart
                .draw_series(points.iter().map(|&p| Circle::new(p, 4, color.filled())))
                .map_err(draw_error)?;
        }
    }

    root.present().map_err(draw_error)?;
    debug!(path = %path.display(), points = points.len(), "Rendered SVG snapshot");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use orderlens_common::test_utils::create_temp_dir;

    fn sample(kind: SnapshotKind) -> Snapshot {
        let mut snapshot = Snapshot::new(kind, "Month", "Orders");
        snapshot.push("2017-01", Some(12.0));
        snapshot.push("2017-02", None);
        snapshot.push("2017-03", Some(30.0));
        snapshot
    }

    #[test]
    fn test_gaps_are_skipped() {
        let snapshot = sample(SnapshotKind::Line);
        assert_eq!(snapshot.points(), vec![(0.0, 12.0), (2.0, 30.0)]);
    }

    #[test]
    fn test_value_range_includes_zero() {
        let mut snapshot = Snapshot::new(SnapshotKind::Bar, "Days", "Frequency");
        snapshot.push("-3", Some(-4.0));
        snapshot.push("5", Some(10.0));
        let (low, high) = snapshot.value_range();
        assert!(low < -4.0);
        assert!(high > 10.0);

        let empty = Snapshot::new(SnapshotKind::Bar, "x", "y");
        assert_eq!(empty.value_range(), (0.0, 1.0));
    }

    #[test]
    fn test_render_svg_writes_file() {
        let dir = create_temp_dir();
        for kind in [SnapshotKind::Bar, SnapshotKind::Line] {
            let path = dir.path().join(format!("{kind:?}.svg"));
            render_svg(&sample(kind), "Monthly Orders", &Theme::default(), &path).unwrap();
            let svg = std::fs::read_to_string(&path).unwrap();
            assert!(svg.contains("<svg"));
        }
    }
}
