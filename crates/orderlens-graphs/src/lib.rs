//! # OrderLens Graphs
//!
//! Turns enriched orders into the report batch: summary tables built with a
//! parameterized aggregator, padded views for the animated charts, Plotly
//! figure JSON, and the HTML and SVG files written per report.

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod aggregator;
pub mod cumulative;
pub mod figure;
pub mod geometry;
pub mod html;
pub mod padder;
pub mod reports;
pub mod runner;
pub mod snapshot;
pub mod summaries;
pub mod theme;

pub use aggregator::{aggregate, AggregateSpec, Field, Reducer, SummaryRow, SummaryTable};
pub use cumulative::{cumulative_customers, CumulativeGrowth};
pub use figure::Figure;
pub use geometry::{Geometry, GeometryFetcher};
pub use html::HtmlWriter;
pub use padder::{month_axis, pad, MonthlyStateSummary, PaddedCell};
pub use reports::{catalogue, check_disabled_ids, Report, ReportContext, ReportOutput};
pub use runner::{ReportFailure, ReportRunner, RunSummary};
pub use snapshot::{render_svg, Snapshot, SnapshotKind};
pub use summaries::{build_state_summaries, LagMetric, StateSummary};
pub use theme::Theme;
