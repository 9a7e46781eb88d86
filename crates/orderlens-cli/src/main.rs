//! OrderLens - batch order analytics reports.
//!
//! Exit status: `0` when every enabled report was written, `1` when the
//! configuration or input could not be used, `2` when the batch finished but
//! at least one report failed.

#![warn(clippy::all)]

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use orderlens_common::{init_default_logging, init_logging};
use orderlens_config::{Config, ConfigError, ConfigLoader};
use orderlens_data::{enrich, load_orders};
use orderlens_graphs::{check_disabled_ids, Geometry, GeometryFetcher, ReportRunner, RunSummary};
use std::process::ExitCode;
use std::time::Instant;
use tracing::{error, info, warn};

use crate::cli::Args;

const EXIT_FATAL: u8 = 1;
const EXIT_REPORT_FAILED: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            // Logging is not configured yet; fall back to the default subscriber.
            let _ = init_default_logging();
            error!("{e:#}");
            return ExitCode::from(EXIT_FATAL);
        }
    };

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::from(EXIT_FATAL);
    }

    info!(version = env!("CARGO_PKG_VERSION"), "Starting OrderLens");

    match run(config).await {
        Ok(summary) if summary.is_success() => ExitCode::SUCCESS,
        Ok(summary) => {
            for failure in &summary.failed {
                warn!(report = failure.id, error = %failure.message, "Report not written");
            }
            ExitCode::from(EXIT_REPORT_FAILED)
        }
        Err(e) => {
            error!("{e:#}");
            ExitCode::from(EXIT_FATAL)
        }
    }
}

/// Loads the configuration file, applies command line overrides and
/// validates the result.
fn load_config(args: &Args) -> Result<Config> {
    let mut config =
        ConfigLoader::load(args.config.as_deref()).context("Failed to load configuration")?;
    args.apply_to(&mut config);
    config
        .validate_all()
        .map_err(ConfigError::ValidationError)
        .context("Invalid configuration")?;
    check_disabled_ids(&config.reports)?;
    Ok(config)
}

async fn run(config: Config) -> Result<RunSummary> {
    let started = Instant::now();

    let input = config.input.path_buf();
    let orders = tokio::task::spawn_blocking(move || load_orders(&input).map(enrich))
        .await
        .context("Input loading task panicked")?
        .context("Failed to load orders")?;
    info!(records = orders.len(), "Orders loaded");

    let geometry = fetch_geometry(&config).await;

    let runner = ReportRunner::from_config(&config);
    info!(directory = %runner.output_dir().display(), "Writing reports");
    let summary = tokio::task::spawn_blocking(move || runner.run(&orders, geometry.as_ref()))
        .await
        .context("Report task panicked")?;

    info!(
        written = summary.written.len(),
        failed = summary.failed.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "OrderLens finished"
    );
    Ok(summary)
}

/// Best-effort geometry download; any failure leaves the maps without shapes.
async fn fetch_geometry(config: &Config) -> Option<Geometry> {
    if !config.geometry.enabled {
        info!("Geometry download disabled; maps will render without shapes");
        return None;
    }
    match GeometryFetcher::new(&config.geometry) {
        Ok(fetcher) => fetcher.fetch_or_none().await,
        Err(e) => {
            warn!(error = %e, "Geometry client unavailable");
            None
        }
    }
}
