//! Time and order-shape charts.

use orderlens_common::Result;
use serde_json::json;

use super::{axis_titles, Report, ReportContext, ReportOutput};
use crate::figure::{colorbar, Figure};
use crate::snapshot::{Snapshot, SnapshotKind};
use crate::summaries::{
    delivery_time_trend, monthly_orders, order_activity, price_by_basket_size, status_mix,
    ActivityMatrix, WEEKDAYS,
};
use crate::theme::{Theme, ACCENT};

/// Distinct orders by weekday and hour of purchase.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActivityHeatmap;

impl Report for ActivityHeatmap {
    fn id(&self) -> &'static str {
        "order_activity_heatmap"
    }

    fn file_name(&self) -> &'static str {
        "fig7.html"
    }

    fn title(&self) -> &'static str {
        "Order Activity: When Do Customers Shop?"
    }

    fn build(&self, ctx: &ReportContext<'_>) -> Result<ReportOutput> {
        let matrix = order_activity(ctx.orders)?;
        let days: Vec<&str> = WEEKDAYS.iter().map(|d| ActivityMatrix::weekday_label(*d)).collect();

        let trace = json!({
            "type": "heatmap",
            "x": (0..24).collect::<Vec<u32>>(),
            "y": days,
            "z": matrix.cells,
            "coloraxis": "coloraxis",
            "hovertemplate": "Hour of Day: %{x}<br>Day of Week: %{y}<br>Total Orders: %{z}<extra></extra>",
        });
        let figure = Figure::new(ctx.theme, self.title(), trace)
            .update_layout(axis_titles("Hour of Day", "Day of Week"))
            .update_layout(json!({
                "xaxis": { "nticks": 24 },
                "yaxis": { "autorange": "reversed" },
                "coloraxis": {
                    "colorscale": ctx.theme.sequential(),
                    "colorbar": colorbar("Total Orders", None),
                },
            }));
        Ok(ReportOutput::figure(figure))
    }
}

/// Mean purchase-to-delivery days per purchase month.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeliveryTrendReport;

impl Report for DeliveryTrendReport {
    fn id(&self) -> &'static str {
        "delivery_time_trend"
    }

    fn file_name(&self) -> &'static str {
        "fig11.html"
    }

    fn title(&self) -> &'static str {
        "Average Delivery Time (days) By Month"
    }

    fn build(&self, ctx: &ReportContext<'_>) -> Result<ReportOutput> {
        let trend = delivery_time_trend(ctx.orders)?;

        let mut snapshot = Snapshot::new(SnapshotKind::Line, "Month", "Avg Delivery Time (days)");
        for (month, days) in &trend {
            snapshot.push(month.to_string(), *days);
        }

        let trace = json!({
            "type": "scatter",
            "mode": "lines+markers",
            "x": trend.iter().map(|(m, _)| m.to_string()).collect::<Vec<_>>(),
            "y": trend.iter().map(|(_, d)| *d).collect::<Vec<_>>(),
            "marker": { "color": ACCENT },
            "hovertemplate": "Month: %{x}<br>Avg Delivery Time: %{y:.2f} days<extra></extra>",
        });
        let figure = Figure::new(ctx.theme, self.title(), trace)
            .update_layout(axis_titles("Month", "Avg Delivery Time (days)"));
        Ok(ReportOutput::with_snapshot(figure, snapshot))
    }
}

/// Record count per purchase month.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonthlyOrdersReport;

impl Report for MonthlyOrdersReport {
    fn id(&self) -> &'static str {
        "monthly_orders"
    }

    fn file_name(&self) -> &'static str {
        "fig12.html"
    }

    fn title(&self) -> &'static str {
        "Monthly Orders Trend"
    }

    #[allow(clippy::cast_precision_loss)]
    fn build(&self, ctx: &ReportContext<'_>) -> Result<ReportOutput> {
        let months = monthly_orders(ctx.orders)?;

        let mut snapshot = Snapshot::new(SnapshotKind::Bar, "Month", "Orders");
        for (month, count) in &months {
            snapshot.push(month.to_string(), Some(*count as f64));
        }

        let counts: Vec<u64> = months.iter().map(|(_, c)| *c).collect();
        let trace = json!({
            "type": "bar",
            "x": months.iter().map(|(m, _)| m.to_string()).collect::<Vec<_>>(),
            "y": counts,
            "text": counts,
            "texttemplate": "%{text}",
            "textposition": "outside",
            "marker": { "color": counts, "coloraxis": "coloraxis" },
            "hovertemplate": "Month: %{x}<br>Orders: %{y}<extra></extra>",
        });
        let figure = Figure::new(ctx.theme, self.title(), trace)
            .update_layout(axis_titles("Month", "Orders"))
            .update_layout(json!({
                "uniformtext": { "minsize": 8, "mode": "hide" },
                "margin": { "t": 50 },
                "coloraxis": {
                    "colorscale": ctx.theme.sequential(),
                    "colorbar": colorbar("Orders", None),
                },
            }));
        Ok(ReportOutput::with_snapshot(figure, snapshot))
    }
}

/// Mean item price by number of items in the order.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasketPriceReport;

impl Report for BasketPriceReport {
    fn id(&self) -> &'static str {
        "price_by_basket_size"
    }

    fn file_name(&self) -> &'static str {
        "fig15.html"
    }

    fn title(&self) -> &'static str {
        "Average Item Price Based On Number Of Items Purchased"
    }

    fn build(&self, ctx: &ReportContext<'_>) -> Result<ReportOutput> {
        let prices = price_by_basket_size(ctx.orders)?;

        let mut snapshot =
            Snapshot::new(SnapshotKind::Bar, "Number of Items Purchased", "Average Item Price ($)");
        for (items, price) in &prices {
            snapshot.push(items.to_string(), *price);
        }

        let values: Vec<Option<f64>> = prices.iter().map(|(_, p)| *p).collect();
        let trace = json!({
            "type": "bar",
            "x": prices.iter().map(|(n, _)| n.to_string()).collect::<Vec<_>>(),
            "y": values,
            "text": values
                .iter()
                .map(|p| p.map(|p| format!("${p:.2}")).unwrap_or_default())
                .collect::<Vec<_>>(),
            "textposition": "outside",
            "marker": { "color": values, "coloraxis": "coloraxis" },
            "hovertemplate": "Items: %{x}<br>Average Item Price: $%{y:.2f}<extra></extra>",
        });
        let figure = Figure::new(ctx.theme, self.title(), trace)
            .update_layout(axis_titles("Number of Items Purchased", "Average Item Price ($)"))
            .update_layout(json!({
                "xaxis": { "type": "category" },
                "uniformtext": { "minsize": 8, "mode": "hide" },
                "margin": { "t": 75 },
                "coloraxis": {
                    "colorscale": ctx.theme.sequential(),
                    "colorbar": colorbar("Avg Item Price ($)", None),
                },
            }));
        Ok(ReportOutput::with_snapshot(figure, snapshot))
    }
}

/// Share of each order status other than `delivered`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusMixReport;

impl Report for StatusMixReport {
    fn id(&self) -> &'static str {
        "order_status_mix"
    }

    fn file_name(&self) -> &'static str {
        "fig16.html"
    }

    fn title(&self) -> &'static str {
        "Order Status Distribution Excluding Delivered Orders"
    }

    fn build(&self, ctx: &ReportContext<'_>) -> Result<ReportOutput> {
        let mix = status_mix(ctx.orders)?;

        let trace = json!({
            "type": "pie",
            "labels": mix.iter().map(|(s, _)| s.as_str()).collect::<Vec<_>>(),
            "values": mix.iter().map(|(_, n)| *n).collect::<Vec<_>>(),
            "marker": {
                "colors": (0..mix.len()).map(Theme::categorical).collect::<Vec<_>>(),
            },
            "sort": false,
            "textposition": "inside",
            "textinfo": "label+percent",
            "textfont": { "size": 11 },
            "pull": 0.03,
            "rotation": 90,
            "hovertemplate": "Order Status: %{label}<br>Percent: %{percent}<extra></extra>",
        });
        let figure = Figure::new(ctx.theme, self.title(), trace).update_layout(json!({
            "legend": { "title": { "text": "Order Status" } },
        }));
        Ok(ReportOutput::figure(figure))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orderlens_common::test_utils::sample_orders;
    use orderlens_data::{enrich, EnrichedOrder};

    fn orders() -> Vec<EnrichedOrder> {
        enrich(sample_orders())
    }

    #[test]
    fn test_heatmap_places_monday_morning() {
        let orders = orders();
        let theme = Theme::default();
        let ctx = ReportContext::new(&orders, &theme, None, "properties.sigla", 1.0);

        let output = ActivityHeatmap.build(&ctx).unwrap();
        let trace = &output.figure.data[0];
        assert_eq!(trace["y"][0], "Monday");
        assert_eq!(trace["z"][0][10], 1);
        assert_eq!(trace["z"][0][11], 1);
        assert!(trace["z"][6][0].is_null());
    }

    #[test]
    fn test_monthly_orders_counts_rows() {
        let orders = orders();
        let theme = Theme::default();
        let ctx = ReportContext::new(&orders, &theme, None, "properties.sigla", 1.0);

        let output = MonthlyOrdersReport.build(&ctx).unwrap();
        let trace = &output.figure.data[0];
        assert_eq!(trace["x"], json!(["2017-01", "2017-02"]));
        assert_eq!(trace["y"], json!([2, 3]));
        assert_eq!(output.snapshot.unwrap().values, vec![Some(2.0), Some(3.0)]);
    }

    #[test]
    fn test_basket_price_labels() {
        let orders = orders();
        let theme = Theme::default();
        let ctx = ReportContext::new(&orders, &theme, None, "properties.sigla", 1.0);

        let output = BasketPriceReport.build(&ctx).unwrap();
        let trace = &output.figure.data[0];
        assert_eq!(trace["x"], json!(["1", "2"]));
        assert_eq!(trace["text"], json!(["$100.00", "$75.00"]));
        assert_eq!(output.figure.layout["xaxis"]["type"], "category");
    }

    #[test]
    fn test_status_mix_pie() {
        let orders = orders();
        let theme = Theme::default();
        let ctx = ReportContext::new(&orders, &theme, None, "properties.sigla", 1.0);

        let output = StatusMixReport.build(&ctx).unwrap();
        let trace = &output.figure.data[0];
        assert_eq!(trace["labels"], json!(["Shipped"]));
        assert_eq!(trace["pull"], 0.03);
        assert!(output.snapshot.is_none());
    }

    #[test]
    fn test_delivery_trend_line_uses_accent() {
        let orders = orders();
        let theme = Theme::default();
        let ctx = ReportContext::new(&orders, &theme, None, "properties.sigla", 1.0);

        let output = DeliveryTrendReport.build(&ctx).unwrap();
        assert_eq!(output.figure.data[0]["marker"]["color"], ACCENT);
        assert_eq!(output.snapshot.unwrap().kind, SnapshotKind::Line);
    }
}
