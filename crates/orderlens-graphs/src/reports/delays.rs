//! Delay distributions for the five lag metrics.

use orderlens_common::Result;
use serde_json::json;

use super::{axis_titles, Report, ReportContext, ReportOutput};
use crate::figure::Figure;
use crate::snapshot::{Snapshot, SnapshotKind};
use crate::summaries::{lag_histogram, DayWindow, LagMetric};

/// Naming and bounds of the two reports drawn for each lag metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LagProfile {
    pub metric: LagMetric,
    /// Values outside the window are left out of the histogram.
    pub window: DayWindow,
    pub histogram_id: &'static str,
    pub histogram_file: &'static str,
    pub choropleth_id: &'static str,
    pub choropleth_file: &'static str,
    /// Question the histogram answers.
    pub title: &'static str,
    pub choropleth_title: &'static str,
    pub x_label: &'static str,
    /// Hover label of the per-state mean.
    pub hover_label: &'static str,
    pub colorbar_title: &'static str,
}

pub static LAG_PROFILES: [LagProfile; 5] = [
    LagProfile {
        metric: LagMetric::DeliveredCarrier,
        window: DayWindow::up_to(91),
        histogram_id: "carrier_to_customer_histogram",
        histogram_file: "fig1.html",
        choropleth_id: "carrier_to_customer_by_state",
        choropleth_file: "fig1_choropleth.html",
        title: "How Long Until Your Order Arrives After Shipping?",
        choropleth_title: "State-Wise: How Long Until Your Order Arrives After Shipping?",
        x_label: "Days",
        hover_label: "Avg Delivery After Shipping",
        colorbar_title: "Avg Delay (Days)",
    },
    LagProfile {
        metric: LagMetric::DeliveredEstimated,
        window: DayWindow::between(-60, 60),
        histogram_id: "delivered_vs_estimate_histogram",
        histogram_file: "fig2.html",
        choropleth_id: "delivered_vs_estimate_by_state",
        choropleth_file: "fig2_choropleth.html",
        title: "How Early are Orders Delivered?",
        choropleth_title: "State-Wise: How Early are Orders Delivered?",
        x_label: "Days (- / +)",
        hover_label: "Avg Difference",
        colorbar_title: "Avg Diff (Days)",
    },
    LagProfile {
        metric: LagMetric::CarrierLimit,
        window: DayWindow::between(-20, 60),
        histogram_id: "shipped_vs_limit_histogram",
        histogram_file: "fig3.html",
        choropleth_id: "shipped_vs_limit_by_state",
        choropleth_file: "fig3_choropleth.html",
        title: "How Early Are Orders Shipped?",
        choropleth_title: "State-Wise: How Early Are Orders Shipped?",
        x_label: "Days (- / +)",
        hover_label: "Avg Difference",
        colorbar_title: "Avg Diff (Days)",
    },
    LagProfile {
        metric: LagMetric::DeliveredOrdered,
        window: DayWindow::up_to(75),
        histogram_id: "purchase_to_delivery_histogram",
        histogram_file: "fig4.html",
        choropleth_id: "purchase_to_delivery_by_state",
        choropleth_file: "fig4_choropleth.html",
        title: "How Long Does Delivery Take?",
        choropleth_title: "State-Wise: How Long Does Delivery Take?",
        x_label: "Days",
        hover_label: "Average Delivery Time",
        colorbar_title: "Avg Time (Days)",
    },
    LagProfile {
        metric: LagMetric::CarrierOrdered,
        window: DayWindow::up_to(50),
        histogram_id: "purchase_to_carrier_histogram",
        histogram_file: "fig5.html",
        choropleth_id: "purchase_to_carrier_by_state",
        choropleth_file: "fig5_choropleth.html",
        title: "How Long Does It Take to Ship?",
        choropleth_title: "State-Wise: How Long Does It Take to Ship?",
        x_label: "Days",
        hover_label: "Average Shipping Delay",
        colorbar_title: "Avg Delay (Days)",
    },
];

/// Histogram of one lag metric in whole days.
///
/// Bins are one day wide and computed here, so the trace is a plain bar
/// chart rather than a client-side histogram.
#[derive(Debug, Clone, Copy)]
pub struct DelayHistogram {
    profile: &'static LagProfile,
}

impl DelayHistogram {
    pub const fn new(profile: &'static LagProfile) -> Self {
        Self { profile }
    }
}

impl Report for DelayHistogram {
    fn id(&self) -> &'static str {
        self.profile.histogram_id
    }

    fn file_name(&self) -> &'static str {
        self.profile.histogram_file
    }

    fn title(&self) -> &'static str {
        self.profile.title
    }

    #[allow(clippy::cast_precision_loss)]
    fn build(&self, ctx: &ReportContext<'_>) -> Result<ReportOutput> {
        let bins = lag_histogram(ctx.orders, self.profile.metric, self.profile.window)?;

        let mut snapshot = Snapshot::new(SnapshotKind::Bar, self.profile.x_label, "Frequency");
        for bin in &bins {
            snapshot.push(bin.days.to_string(), Some(bin.count as f64));
        }

        let trace = json!({
            "type": "bar",
            "x": bins.iter().map(|b| b.days).collect::<Vec<_>>(),
            "y": bins.iter().map(|b| b.count).collect::<Vec<_>>(),
            "width": 1,
            "marker": { "line": { "width": 0 } },
            "hovertemplate": "Days: %{x}<br>Frequency: %{y}<extra></extra>",
        });
        let figure = Figure::new(ctx.theme, self.title(), trace)
            .update_layout(axis_titles(self.profile.x_label, "Frequency"))
            .update_layout(json!({ "bargap": 0 }));

        Ok(ReportOutput::with_snapshot(figure, snapshot))
    }
}
