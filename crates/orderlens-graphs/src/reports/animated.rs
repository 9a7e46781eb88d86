//! Animated month-by-month views over every state.
//!
//! Both views read from a padded table, so every frame carries every state
//! and the bars never jump between frames. Padded cells hold the sentinel,
//! which keeps the log axis defined; their hover text says so.

use orderlens_common::{format_optional, MonthBucket, Result, StateCode};
use serde_json::{json, Value};
use std::collections::{BTreeMap, BTreeSet};

use super::{Report, ReportContext, ReportOutput};
use crate::cumulative::cumulative_customers;
use crate::figure::{animation_controls, log_axis_range, Figure};
use crate::padder::{month_axis, pad, MonthlyStateSummary};
use crate::summaries::monthly_sales;
use crate::theme::Theme;

/// Cells grouped by frame, preserving the frame-major order of the padder.
fn frames_of(cells: &[MonthlyStateSummary]) -> BTreeMap<MonthBucket, Vec<&MonthlyStateSummary>> {
    let mut frames: BTreeMap<MonthBucket, Vec<&MonthlyStateSummary>> = BTreeMap::new();
    for cell in cells {
        frames.entry(cell.frame).or_default().push(cell);
    }
    frames
}

fn max_value(cells: &[MonthlyStateSummary]) -> f64 {
    cells.iter().map(|c| c.value).fold(0.0, f64::max)
}

/// Stable colour per state, independent of the order bars are drawn in.
fn state_colors(cells: &[MonthlyStateSummary]) -> BTreeMap<&StateCode, &'static str> {
    let states: BTreeSet<&StateCode> = cells.iter().map(|c| &c.member).collect();
    states
        .into_iter()
        .enumerate()
        .map(|(i, state)| (state, Theme::categorical(i)))
        .collect()
}

/// Assembles the figure: the first frame is the initial trace.
fn animated_figure(ctx: &ReportContext<'_>, title: &str, frames: Vec<(String, Value)>) -> Figure {
    let names: Vec<String> = frames.iter().map(|(name, _)| name.clone()).collect();
    let initial = frames
        .first()
        .map_or_else(|| json!({ "type": "bar", "x": [], "y": [] }), |(_, t)| t.clone());
    let frames = frames
        .into_iter()
        .map(|(name, trace)| json!({ "name": name, "data": [trace] }))
        .collect();

    Figure::new(ctx.theme, title, initial)
        .update_layout(animation_controls(&names))
        .with_frames(frames)
}

/// Price sums per state for each purchase month, on a log axis.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonthlySalesReport;

impl MonthlySalesReport {
    /// Padded (month, state) sales over the full month range and every
    /// state present in the input.
    ///
    /// Pairs whose sum is not positive cannot sit on the log axis and are
    /// padded with the sentinel like pairs without records.
    pub fn table(ctx: &ReportContext<'_>) -> Result<Vec<MonthlyStateSummary>> {
        let mut sales = monthly_sales(ctx.orders)?;
        let months = month_axis(sales.keys().map(|(month, _)| month));
        sales.retain(|_, total| *total > 0.0);
        let states: Vec<StateCode> = ctx
            .orders
            .iter()
            .map(|o| o.record.customer_state.clone())
            .collect();
        Ok(pad(&months, &states, &sales, ctx.sentinel))
    }
}

impl Report for MonthlySalesReport {
    fn id(&self) -> &'static str {
        "monthly_sales_by_state"
    }

    fn file_name(&self) -> &'static str {
        "fig13.html"
    }

    fn title(&self) -> &'static str {
        "Monthly Sales by State (Log Scale)"
    }

    fn build(&self, ctx: &ReportContext<'_>) -> Result<ReportOutput> {
        let cells = Self::table(ctx)?;
        let colors = state_colors(&cells);

        let frames = frames_of(&cells)
            .into_iter()
            .map(|(month, row)| {
                let trace = json!({
                    "type": "bar",
                    "x": row.iter().map(|c| c.member.display_name()).collect::<Vec<_>>(),
                    "y": row.iter().map(|c| c.value).collect::<Vec<_>>(),
                    "hovertext": row
                        .iter()
                        .map(|c| if c.padded { "no sales".to_string() } else { format_optional(Some(c.value), 2) })
                        .collect::<Vec<_>>(),
                    "marker": {
                        "color": row.iter().map(|c| colors.get(&c.member).copied()).collect::<Vec<_>>(),
                    },
                    "hovertemplate": "<b>%{x}</b><br>Monthly Sales: %{hovertext}<extra></extra>",
                });
                (month.to_string(), trace)
            })
            .collect();

        let figure = animated_figure(ctx, self.title(), frames).update_layout(json!({
            "yaxis": {
                "type": "log",
                "range": log_axis_range(ctx.sentinel, max_value(&cells)),
                "title": { "text": "Monthly Sales" },
            },
            "xaxis": {
                "tickangle": -45,
                "tickfont": { "size": 10 },
                "title": { "text": null },
            },
            "showlegend": false,
        }));
        Ok(ReportOutput::figure(figure))
    }
}

/// Running count of acquired customers per state, bars sorted within each
/// month.
#[derive(Debug, Clone, Copy, Default)]
pub struct CumulativeCustomersReport;

impl Report for CumulativeCustomersReport {
    fn id(&self) -> &'static str {
        "cumulative_customers_by_state"
    }

    fn file_name(&self) -> &'static str {
        "fig14.html"
    }

    fn title(&self) -> &'static str {
        "Cumulative Customer Growth by State (Log Scale)"
    }

    fn build(&self, ctx: &ReportContext<'_>) -> Result<ReportOutput> {
        let cells = cumulative_customers(ctx.orders).padded(ctx.sentinel);
        let colors = state_colors(&cells);

        let frames = frames_of(&cells)
            .into_iter()
            .map(|(month, mut row)| {
                row.sort_by(|a, b| {
                    a.value
                        .total_cmp(&b.value)
                        .then_with(|| a.member.display_name().cmp(&b.member.display_name()))
                });
                let trace = json!({
                    "type": "bar",
                    "orientation": "h",
                    "x": row.iter().map(|c| c.value).collect::<Vec<_>>(),
                    "y": row.iter().map(|c| c.member.display_name()).collect::<Vec<_>>(),
                    "hovertext": row
                        .iter()
                        .map(|c| if c.padded { "0".to_string() } else { format_optional(Some(c.value), 0) })
                        .collect::<Vec<_>>(),
                    "marker": {
                        "color": row.iter().map(|c| colors.get(&c.member).copied()).collect::<Vec<_>>(),
                    },
                    "hovertemplate": "<b>%{y}</b><br>Cumulative Customers: %{hovertext}<extra></extra>",
                });
                (month.to_string(), trace)
            })
            .collect();

        let figure = animated_figure(ctx, self.title(), frames).update_layout(json!({
            "xaxis": {
                "type": "log",
                "range": log_axis_range(ctx.sentinel, max_value(&cells)),
                "showticklabels": false,
                "title": { "text": null },
            },
            "yaxis": { "title": { "text": "Customer State" } },
            "showlegend": false,
        }));
        Ok(ReportOutput::figure(figure))
    }
}
