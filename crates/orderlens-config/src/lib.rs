//! # OrderLens Config
//!
//! Type-safe configuration for OrderLens: a serde schema with defaults,
//! YAML/TOML loading with environment overrides, and validation.

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod defaults;
pub mod loader;
pub mod schema;
pub mod validation;

pub use defaults::*;
pub use loader::*;
pub use schema::*;
pub use validation::*;
