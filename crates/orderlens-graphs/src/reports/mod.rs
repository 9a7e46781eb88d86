//! The report catalogue.
//!
//! Every report turns the enriched orders into one Plotly figure. Reports are
//! independent: each is built and written inside its own `Result` so a
//! failure in one never stops the others.

use once_cell::unsync::OnceCell;
use orderlens_common::{OrderLensError, Result};
use orderlens_config::ReportsConfig;
use orderlens_data::EnrichedOrder;
use serde_json::{json, Value};

use crate::figure::Figure;
use crate::geometry::Geometry;
use crate::snapshot::Snapshot;
use crate::summaries::{build_state_summaries, StateSummary};
use crate::theme::Theme;

mod animated;
mod delays;
mod states;
mod trends;

pub use animated::{CumulativeCustomersReport, MonthlySalesReport};
pub use delays::{DelayHistogram, LagProfile, LAG_PROFILES};
pub use states::{LateShareReport, StateChoropleth};
pub use trends::{
    ActivityHeatmap, BasketPriceReport, DeliveryTrendReport, MonthlyOrdersReport, StatusMixReport,
};

/// A single chart of the batch.
pub trait Report: Send + Sync {
    /// Stable identifier used in configuration and logs.
    fn id(&self) -> &'static str;

    /// Output file name inside the output directory.
    fn file_name(&self) -> &'static str;

    /// Chart and page title.
    fn title(&self) -> &'static str;

    /// Builds the figure from the shared context.
    fn build(&self, ctx: &ReportContext<'_>) -> Result<ReportOutput>;
}

/// What a report produces.
#[derive(Debug, Clone)]
pub struct ReportOutput {
    pub figure: Figure,
    /// Static rendition for bar, histogram and line charts.
    pub snapshot: Option<Snapshot>,
}

impl ReportOutput {
    pub fn figure(figure: Figure) -> Self {
        Self {
            figure,
            snapshot: None,
        }
    }

    pub fn with_snapshot(figure: Figure, snapshot: Snapshot) -> Self {
        Self {
            figure,
            snapshot: Some(snapshot),
        }
    }
}

/// Inputs shared by every report of one run.
pub struct ReportContext<'a> {
    pub orders: &'a [EnrichedOrder],
    pub theme: &'a Theme,
    /// Boundary shapes; `None` when the fetch failed or was skipped.
    pub geometry: Option<&'a Geometry>,
    pub feature_id_key: &'a str,
    /// Placeholder value for padded cells of the animated views.
    pub sentinel: f64,
    summaries: OnceCell<Vec<StateSummary>>,
}

impl<'a> ReportContext<'a> {
    pub fn new(
        orders: &'a [EnrichedOrder],
        theme: &'a Theme,
        geometry: Option<&'a Geometry>,
        feature_id_key: &'a str,
        sentinel: f64,
    ) -> Self {
        Self {
            orders,
            theme,
            geometry,
            feature_id_key,
            sentinel,
            summaries: OnceCell::new(),
        }
    }

    /// Per-state summaries, computed on first use and shared afterwards.
    pub fn state_summaries(&self) -> Result<&[StateSummary]> {
        self.summaries
            .get_or_try_init(|| build_state_summaries(self.orders))
            .map(Vec::as_slice)
    }
}

/// All reports in output order.
pub fn catalogue() -> Vec<Box<dyn Report>> {
    let mut reports: Vec<Box<dyn Report>> = Vec::with_capacity(23);
    reports.extend(
        LAG_PROFILES
            .iter()
            .map(|profile| Box::new(DelayHistogram::new(profile)) as Box<dyn Report>),
    );
    reports.extend(
        LAG_PROFILES
            .iter()
            .map(|profile| Box::new(StateChoropleth::lag(profile)) as Box<dyn Report>),
    );
    reports.push(Box::new(StateChoropleth::demographics()));
    reports.push(Box::new(ActivityHeatmap));
    reports.push(Box::new(LateShareReport));
    reports.push(Box::new(StateChoropleth::average_price()));
    reports.push(Box::new(StateChoropleth::average_freight()));
    reports.push(Box::new(DeliveryTrendReport));
    reports.push(Box::new(MonthlyOrdersReport));
    reports.push(Box::new(MonthlySalesReport));
    reports.push(Box::new(CumulativeCustomersReport));
    reports.push(Box::new(BasketPriceReport));
    reports.push(Box::new(StatusMixReport));
    reports.push(Box::new(StateChoropleth::lifetime_value()));
    reports.push(Box::new(StateChoropleth::orders()));
    reports
}

/// Rejects disabled ids that name no report.
pub fn check_disabled_ids(config: &ReportsConfig) -> Result<()> {
    let known: Vec<&'static str> = catalogue().iter().map(|r| r.id()).collect();
    let unknown: Vec<&str> = config
        .disabled
        .iter()
        .map(String::as_str)
        .filter(|id| !known.contains(id))
        .collect();

    if unknown.is_empty() {
        Ok(())
    } else {
        Err(OrderLensError::config(format!(
            "reports.disabled names unknown reports: {}",
            unknown.join(", ")
        )))
    }
}

/// Axis titles for a cartesian chart.
pub(crate) fn axis_titles(x: &str, y: &str) -> Value {
    json!({
        "xaxis": { "title": { "text": x } },
        "yaxis": { "title": { "text": y } },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use orderlens_common::test_utils::sample_orders;
    use orderlens_data::enrich;
    use std::collections::HashSet;

    #[test]
    fn test_catalogue_ids_and_files_are_unique() {
        let reports = catalogue();
        assert_eq!(reports.len(), 23);

        let ids: HashSet<&str> = reports.iter().map(|r| r.id()).collect();
        let files: HashSet<&str> = reports.iter().map(|r| r.file_name()).collect();
        assert_eq!(ids.len(), 23);
        assert_eq!(files.len(), 23);
        assert_eq!(reports[0].file_name(), "fig1.html");
        assert_eq!(reports[5].file_name(), "fig1_choropleth.html");
        assert_eq!(reports[22].file_name(), "fig18.html");
    }

    #[test]
    fn test_check_disabled_ids() {
        let mut config = ReportsConfig::default();
        assert!(check_disabled_ids(&config).is_ok());

        config.disabled = vec!["monthly_orders".to_string()];
        assert!(check_disabled_ids(&config).is_ok());

        config.disabled.push("fig99".to_string());
        let err = check_disabled_ids(&config).unwrap_err();
        assert!(err.to_string().contains("fig99"));
    }

    #[test]
    fn test_state_summaries_are_computed_once() {
        let orders = enrich(sample_orders());
        let theme = Theme::default();
        let ctx = ReportContext::new(&orders, &theme, None, "properties.sigla", 1.0);

        let first = ctx.state_summaries().unwrap().as_ptr();
        let second = ctx.state_summaries().unwrap().as_ptr();
        assert_eq!(first, second);
    }

    #[test]
    fn test_every_report_builds_from_sample_orders() {
        let orders = enrich(sample_orders());
        let theme = Theme::default();
        let ctx = ReportContext::new(&orders, &theme, None, "properties.sigla", 1.0);

        for report in catalogue() {
            let output = report.build(&ctx).unwrap();
            assert_eq!(output.figure.layout["title"]["text"], report.title());
            assert!(!output.figure.data.is_empty(), "{} has no trace", report.id());
        }
    }

    #[test]
    fn test_every_report_builds_from_empty_input() {
        let theme = Theme::default();
        let ctx = ReportContext::new(&[], &theme, None, "properties.sigla", 1.0);
        for report in catalogue() {
            assert!(report.build(&ctx).is_ok(), "{} failed on empty input", report.id());
        }
    }
}
