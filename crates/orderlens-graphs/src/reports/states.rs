//! State-level maps and the late-delivery share chart.

use orderlens_common::Result;
use serde_json::{json, Value};

use super::delays::LagProfile;
use super::{axis_titles, Report, ReportContext, ReportOutput};
use crate::figure::{choropleth_layout, choropleth_trace, colorbar, Figure};
use crate::snapshot::{Snapshot, SnapshotKind};
use crate::summaries::{LagMetric, StateSummary};
use crate::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scale {
    Diverging,
    Demographics,
}

impl Scale {
    fn resolve(self, theme: &Theme) -> Value {
        match self {
            Self::Diverging => theme.diverging(),
            Self::Demographics => theme.demographics(),
        }
    }
}

type Extract = fn(&StateSummary) -> Option<f64>;

/// Where the coloured value of a map comes from.
#[derive(Clone, Copy)]
enum Measure {
    Lag(LagMetric),
    Field(Extract),
}

impl Measure {
    fn of(self, summary: &StateSummary) -> Option<f64> {
        match self {
            Self::Lag(metric) => summary.lag_mean(metric),
            Self::Field(extract) => extract(summary),
        }
    }
}

/// A choropleth colouring each state by one summary value.
///
/// `customdata` holds the coloured value first, followed by any extra
/// values the hover template reads.
#[derive(Clone)]
pub struct StateChoropleth {
    id: &'static str,
    file_name: &'static str,
    title: &'static str,
    colorbar_title: &'static str,
    hovertemplate: String,
    scale: Scale,
    value: Measure,
    extras: Vec<Extract>,
}

#[allow(clippy::cast_precision_loss)]
fn count(value: u64) -> Option<f64> {
    Some(value as f64)
}

fn cities(summary: &StateSummary) -> Option<f64> {
    count(summary.cities)
}

fn zip_prefixes(summary: &StateSummary) -> Option<f64> {
    count(summary.zip_prefixes)
}

fn state_hover(lines: &[String]) -> String {
    format!("<b>%{{hovertext}}</b><br>{}<br><extra></extra>", lines.join("<br>"))
}

impl StateChoropleth {
    fn simple(
        id: &'static str,
        file_name: &'static str,
        title: &'static str,
        colorbar_title: &'static str,
        hover_line: &str,
        value: Measure,
    ) -> Self {
        Self {
            id,
            file_name,
            title,
            colorbar_title,
            hovertemplate: state_hover(&[hover_line.to_string()]),
            scale: Scale::Diverging,
            value,
            extras: Vec::new(),
        }
    }

    /// Mean of one lag metric per state.
    pub fn lag(profile: &'static LagProfile) -> Self {
        Self::simple(
            profile.choropleth_id,
            profile.choropleth_file,
            profile.choropleth_title,
            profile.colorbar_title,
            &format!("{}: %{{customdata[0]:.2f}} days", profile.hover_label),
            Measure::Lag(profile.metric),
        )
    }

    /// Distinct customers, with city and zip-prefix counts on hover.
    pub fn demographics() -> Self {
        Self {
            id: "customer_demographics",
            file_name: "fig6.html",
            title: "Customer Demographics by State, City & Region",
            colorbar_title: "Customer Count",
            hovertemplate: state_hover(&[
                "Number of Customers: %{customdata[0]:,}".to_string(),
                "Cities: %{customdata[1]:,}".to_string(),
                "Unique Regions: %{customdata[2]:,}".to_string(),
            ]),
            scale: Scale::Demographics,
            value: Measure::Field(|s| count(s.customers)),
            extras: vec![cities as Extract, zip_prefixes as Extract],
        }
    }

    pub fn average_price() -> Self {
        Self::simple(
            "average_price_by_state",
            "fig9.html",
            "Average Sales Price by State",
            "Avg Sales ($)",
            "Average Sales: $%{customdata[0]:,.2f}",
            Measure::Field(|s| s.mean_price),
        )
    }

    pub fn average_freight() -> Self {
        Self::simple(
            "average_freight_by_state",
            "fig10.html",
            "Average Freight Cost by State",
            "Avg Freight ($)",
            "Average Freight: $%{customdata[0]:,.2f}",
            Measure::Field(|s| s.mean_freight),
        )
    }

    pub fn lifetime_value() -> Self {
        Self::simple(
            "lifetime_value_by_state",
            "fig17.html",
            "Average Customer Lifetime Value by State",
            "Avg CLV ($)",
            "Average CLV: $%{customdata[0]:,.2f}",
            Measure::Field(|s| s.mean_lifetime_value),
        )
    }

    pub fn orders() -> Self {
        Self::simple(
            "orders_by_state",
            "fig18.html",
            "Total Orders by State",
            "Total Orders",
            "Orders Count: %{customdata[0]:,}",
            Measure::Field(|s| count(s.orders)),
        )
    }
}

impl Report for StateChoropleth {
    fn id(&self) -> &'static str {
        self.id
    }

    fn file_name(&self) -> &'static str {
        self.file_name
    }

    fn title(&self) -> &'static str {
        self.title
    }

    fn build(&self, ctx: &ReportContext<'_>) -> Result<ReportOutput> {
        let summaries = ctx.state_summaries()?;

        let locations = summaries.iter().map(|s| s.state.as_str().to_string()).collect();
        let names = summaries.iter().map(|s| s.state.display_name()).collect();
        let z: Vec<Option<f64>> = summaries.iter().map(|s| self.value.of(s)).collect();
        let customdata = summaries
            .iter()
            .zip(&z)
            .map(|(summary, value)| {
                let mut row = vec![json!(value)];
                row.extend(self.extras.iter().map(|extra| json!(extra(summary))));
                Value::Array(row)
            })
            .collect();

        let trace = choropleth_trace(
            ctx.geometry,
            ctx.feature_id_key,
            locations,
            z,
            names,
            customdata,
            &self.hovertemplate,
        );
        let figure = Figure::new(ctx.theme, self.title, trace).update_layout(choropleth_layout(
            self.scale.resolve(ctx.theme),
            self.colorbar_title,
        ));
        Ok(ReportOutput::figure(figure))
    }
}

/// Share of late deliveries per state, highest first.
///
/// States without a single qualifying order have no share and are left out.
#[derive(Debug, Clone, Copy, Default)]
pub struct LateShareReport;

impl Report for LateShareReport {
    fn id(&self) -> &'static str {
        "late_delivery_share"
    }

    fn file_name(&self) -> &'static str {
        "fig8.html"
    }

    fn title(&self) -> &'static str {
        "Percentage of Late Deliveries per State"
    }

    fn build(&self, ctx: &ReportContext<'_>) -> Result<ReportOutput> {
        let mut shares: Vec<(String, f64)> = ctx
            .state_summaries()?
            .iter()
            .filter_map(|s| Some((s.state.display_name(), s.late_ratio?)))
            .collect();
        shares.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        let mut snapshot = Snapshot::new(SnapshotKind::Bar, "State", "Percentage of Late Orders");
        for (name, share) in &shares {
            snapshot.push(name.clone(), Some(*share));
        }

        let values: Vec<f64> = shares.iter().map(|s| s.1).collect();
        let trace = json!({
            "type": "bar",
            "x": shares.iter().map(|s| s.0.as_str()).collect::<Vec<_>>(),
            "y": values,
            "text": values.iter().map(|v| format!("{v:.2}")).collect::<Vec<_>>(),
            "textposition": "outside",
            "marker": { "color": values, "coloraxis": "coloraxis" },
            "hovertemplate": "State: %{x}<br>Late share: %{y:.2f}<extra></extra>",
        });

        let figure = Figure::new(ctx.theme, self.title(), trace)
            .update_layout(axis_titles("State", "Percentage of Late Orders"))
            .update_layout(json!({
                "xaxis": { "tickangle": -45, "tickfont": { "size": 10 } },
                "yaxis": { "showgrid": true, "gridcolor": "lightgray" },
                "margin": { "t": 45 },
                "coloraxis": {
                    "colorscale": ctx.theme.demographics(),
                    "colorbar": colorbar("Percentage of Late Orders", None),
                },
            }));
        Ok(ReportOutput::with_snapshot(figure, snapshot))
    }
}
