//! # OrderLens Common
//!
//! Shared types, errors, and the logging bootstrap used across the OrderLens
//! workspace.

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod logging;
pub mod states;
pub mod types;
pub mod utils;

#[cfg(any(test, feature = "testing"))]
pub mod test_utils;

// Re-export commonly used types
pub use error::{OrderLensError, Result};
pub use logging::{init_default_logging, init_logging, LoggingConfig};
pub use states::{state_name, STATE_NAMES};
pub use types::*;
pub use utils::*;
