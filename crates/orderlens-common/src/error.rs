//! Error types and utilities for OrderLens

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for OrderLens operations
pub type Result<T> = std::result::Result<T, OrderLensError>;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for OrderLens operations
#[derive(Error, Debug)]
pub enum OrderLensError {
    /// Configuration related errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or malformed source data
    #[error("Input error: {message}")]
    Input {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<BoxedSource>,
    },

    /// Network related errors (boundary geometry fetch)
    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Report building and rendering errors
    #[error("Report error: {message}")]
    Report {
        message: String,
        report: Option<String>,
        #[source]
        source: Option<BoxedSource>,
    },

    /// Validation errors for configuration values or data
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    /// Generic error with custom message
    #[error("{message}")]
    Generic {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },
}

impl OrderLensError {
    /// Create a new generic error with a custom message
    pub fn new(msg: impl Into<String>) -> Self {
        Self::Generic {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new generic error with a custom message and source
    pub fn with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Generic {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new configuration error with source
    pub fn config_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new input error
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input {
            message: msg.into(),
            path: None,
            source: None,
        }
    }

    /// Create a new input error tied to a file
    pub fn input_at(msg: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::Input {
            message: msg.into(),
            path: Some(path.into()),
            source: None,
        }
    }

    /// Create a new input error with source
    pub fn input_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Input {
            message: msg.into(),
            path: None,
            source: Some(Box::new(source)),
        }
    }

    /// Create a new network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new network error with source
    pub fn network_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Network {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new report error
    pub fn report(msg: impl Into<String>) -> Self {
        Self::Report {
            message: msg.into(),
            report: None,
            source: None,
        }
    }

    /// Create a new report error naming the failing report
    pub fn report_named(msg: impl Into<String>, report: impl Into<String>) -> Self {
        Self::Report {
            message: msg.into(),
            report: Some(report.into()),
            source: None,
        }
    }

    /// Create a new report error with source
    pub fn report_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Report {
            message: msg.into(),
            report: None,
            source: Some(Box::new(source)),
        }
    }

    /// Create a new validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            field: None,
        }
    }

    /// Create a new validation error with field name
    pub fn validation_field(msg: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            field: Some(field.into()),
        }
    }

    /// Whether this error must abort the batch before any report is built
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Config { .. } | Self::Input { .. } | Self::Validation { .. }
        )
    }
}

// Error conversion implementations for external types

/// Convert from reqwest::Error to OrderLensError
impl From<reqwest::Error> for OrderLensError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::network_with_source("Request timeout", err)
        } else if err.is_connect() {
            Self::network_with_source("Connection failed", err)
        } else if err.is_status() {
            let status_code = err.status().map(|s| s.as_u16()).unwrap_or(0);
            Self::network_with_source(format!("HTTP error: {}", status_code), err)
        } else {
            Self::network_with_source("Network request failed", err)
        }
    }
}

/// Convert from csv::Error to OrderLensError
impl From<csv::Error> for OrderLensError {
    fn from(err: csv::Error) -> Self {
        let message = match err.position() {
            Some(pos) => format!("Malformed CSV record at line {}", pos.line()),
            None => "Malformed CSV input".to_string(),
        };
        Self::input_with_source(message, err)
    }
}

/// Convert from serde_yaml::Error to OrderLensError
impl From<serde_yaml::Error> for OrderLensError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::config_with_source("YAML parsing error", err)
    }
}

/// Convert from toml::de::Error to OrderLensError
impl From<toml::de::Error> for OrderLensError {
    fn from(err: toml::de::Error) -> Self {
        Self::config_with_source("TOML parsing error", err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{error::Error, io};

    #[test]
    fn test_error_creation() {
        let error = OrderLensError::new("test message");
        assert!(error.to_string().contains("test message"));

        let config_error = OrderLensError::config("config issue");
        assert_eq!(config_error.to_string(), "Configuration error: config issue");

        let input_error = OrderLensError::input_at("missing column 'price'", "orders.csv");
        assert_eq!(input_error.to_string(), "Input error: missing column 'price'");
        match input_error {
            OrderLensError::Input { path, .. } => {
                assert_eq!(path, Some(PathBuf::from("orders.csv")));
            }
            other => panic!("unexpected variant: {other:?}"),
        }

        let report_error = OrderLensError::report_named("empty figure", "fig13.html");
        assert!(report_error.to_string().contains("Report error"));

        let validation_error = OrderLensError::validation_field("must be positive", "sentinel");
        assert!(validation_error.to_string().contains("Validation error"));
    }

    #[test]
    fn test_error_with_source() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let wrapped_error = OrderLensError::with_source("Failed to read file", io_error);

        assert!(wrapped_error.to_string().contains("Failed to read file"));
        assert!(wrapped_error.source().is_some());

        let network_error = OrderLensError::network_with_source(
            "GeoJSON download failed",
            io::Error::new(io::ErrorKind::ConnectionRefused, "refused"),
        );
        assert!(network_error.source().is_some());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error: OrderLensError = io_error.into();

        assert!(error.to_string().contains("I/O error"));
        assert!(error.source().is_some());
    }

    #[test]
    fn test_serde_error_conversion() {
        let serde_error = serde_json::from_str::<serde_json::Value>(r#"{"invalid": json}"#)
            .unwrap_err();
        let error: OrderLensError = serde_error.into();

        assert!(error.to_string().contains("Serialization error"));
    }

    #[test]
    fn test_fatal_classification() {
        assert!(OrderLensError::input("bad file").is_fatal());
        assert!(OrderLensError::config("bad config").is_fatal());
        assert!(!OrderLensError::network("offline").is_fatal());
        assert!(!OrderLensError::report("render failed").is_fatal());
    }
}
