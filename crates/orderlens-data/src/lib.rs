//! # OrderLens Data
//!
//! Loads the order-fact table and attaches the per-record metrics every
//! report reads from.

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod columns;
pub mod derive;
pub mod loader;

pub use derive::{difference_in_days, enrich, normalize_to_day, DerivedMetrics, EnrichedOrder};
pub use loader::{load_orders, SourceFormat};
