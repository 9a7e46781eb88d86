//! Runs the report catalogue and writes the output files.

use orderlens_common::Result;
use orderlens_config::{Config, ReportsConfig};
use orderlens_data::EnrichedOrder;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, instrument};

use crate::geometry::Geometry;
use crate::html::HtmlWriter;
use crate::reports::{catalogue, Report, ReportContext};
use crate::snapshot::render_svg;
use crate::theme::Theme;

/// A report that could not be built or written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFailure {
    pub id: &'static str,
    pub message: String,
}

/// Outcome of one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Every file written, HTML pages and SVG snapshots alike.
    pub written: Vec<PathBuf>,
    /// Reports turned off in the configuration.
    pub skipped: Vec<&'static str>,
    pub failed: Vec<ReportFailure>,
}

impl RunSummary {
    /// True when no report failed.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Builds every enabled report in catalogue order.
#[derive(Debug, Clone)]
pub struct ReportRunner {
    theme: Theme,
    writer: HtmlWriter,
    output_dir: PathBuf,
    feature_id_key: String,
    sentinel: f64,
    svg_snapshots: bool,
    reports: ReportsConfig,
}

impl ReportRunner {
    pub fn from_config(config: &Config) -> Self {
        Self {
            theme: Theme::from_config(&config.presentation),
            writer: HtmlWriter::from_config(&config.output),
            output_dir: config.output.directory_buf(),
            feature_id_key: config.geometry.feature_id_key.clone(),
            sentinel: config.padding.sentinel,
            svg_snapshots: config.presentation.svg_snapshots,
            reports: config.reports.clone(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Runs the batch. A failing report is logged and counted; the rest still
    /// run.
    #[instrument(skip_all, fields(records = orders.len(), geometry = geometry.is_some()))]
    pub fn run(&self, orders: &[EnrichedOrder], geometry: Option<&Geometry>) -> RunSummary {
        let started = Instant::now();
        let ctx = ReportContext::new(
            orders,
            &self.theme,
            geometry,
            &self.feature_id_key,
            self.sentinel,
        );

        let mut summary = RunSummary::default();
        for report in catalogue() {
            let id = report.id();
            if !self.reports.is_enabled(id) {
                debug!(report = id, "Report disabled");
                summary.skipped.push(id);
                continue;
            }

            match self.run_one(report.as_ref(), &ctx) {
                Ok(paths) => summary.written.extend(paths),
                Err(e) => {
                    error!(report = id, error = %e, "Report failed");
                    summary.failed.push(ReportFailure {
                        id,
                        message: e.to_string(),
                    });
                }
            }
        }

        info!(
            written = summary.written.len(),
            skipped = summary.skipped.len(),
            failed = summary.failed.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Report batch finished"
        );
        summary
    }

    fn run_one(&self, report: &dyn Report, ctx: &ReportContext<'_>) -> Result<Vec<PathBuf>> {
        let output = report.build(ctx)?;
        let mut paths = vec![self.writer.write(
            &self.output_dir,
            report.file_name(),
            report.title(),
            &output.figure,
        )?];

        if self.svg_snapshots {
            if let Some(snapshot) = &output.snapshot {
                let path = self
                    .output_dir
                    .join(Path::new(report.file_name()).with_extension("svg"));
                render_svg(snapshot, report.title(), &self.theme, &path)?;
                paths.push(path);
            }
        }

        info!(report = report.id(), file = report.file_name(), "Report written");
        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orderlens_common::test_utils::{create_temp_dir, sample_orders};
    use orderlens_data::enrich;

    fn config_for(dir: &Path) -> Config {
        let mut config = Config::default();
        config.output.directory = dir.display().to_string();
        config
    }

    #[test]
    fn test_disabled_reports_are_skipped() {
        let dir = create_temp_dir();
        let mut config = config_for(dir.path());
        config.reports.disabled = vec!["order_status_mix".to_string(), "monthly_orders".to_string()];

        let orders = enrich(sample_orders());
        let summary = ReportRunner::from_config(&config).run(&orders, None);

        assert!(summary.is_success());
        assert_eq!(summary.skipped, vec!["monthly_orders", "order_status_mix"]);
        assert_eq!(summary.written.len(), 21);
        assert!(!dir.path().join("fig16.html").exists());
    }

    #[test]
    fn test_svg_snapshots_written_alongside_pages() {
        let dir = create_temp_dir();
        let mut config = config_for(dir.path());
        config.presentation.svg_snapshots = true;

        let orders = enrich(sample_orders());
        let summary = ReportRunner::from_config(&config).run(&orders, None);

        assert!(summary.is_success());
        assert!(dir.path().join("fig12.svg").exists());
        assert!(dir.path().join("fig1.svg").exists());
        assert!(!dir.path().join("fig16.svg").exists());
        // 23 pages, 5 histograms, late share, trend, monthly orders, basket size
        assert_eq!(summary.written.len(), 23 + 9);
    }

    #[test]
    fn test_unwritable_output_fails_every_report() {
        let dir = create_temp_dir();
        let blocker = dir.path().join("not-a-directory");
        std::fs::write(&blocker, b"x").unwrap();

        let orders = enrich(sample_orders());
        let summary = ReportRunner::from_config(&config_for(&blocker)).run(&orders, None);

        assert!(!summary.is_success());
        assert_eq!(summary.failed.len(), 23);
        assert!(summary.written.is_empty());
    }
}
