//! Structured logging infrastructure for OrderLens

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Configuration for the logging system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "orderlens_graphs=trace")
    pub level: String,
    /// Whether to emit JSON lines
    pub json_format: bool,
    /// Whether to enable pretty formatting with colors
    pub pretty_format: bool,
    /// Optional file path for log output
    pub file_path: Option<String>,
    /// Whether to include target module information
    pub include_targets: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            pretty_format: false,
            file_path: None,
            include_targets: true,
        }
    }
}

/// Builds the level filter, letting `RUST_LOG` win over the configured level.
fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize the tracing subscriber with the given configuration
pub fn init_logging(config: &LoggingConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let env_filter = build_filter(&config.level);
    let registry = tracing_subscriber::registry().with(env_filter);

    if let Some(file_path) = &config.file_path {
        let path = Path::new(file_path);
        let directory = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let file_name = path
            .file_name()
            .ok_or_else(|| format!("log file path '{file_path}' has no file name"))?;
        std::fs::create_dir_all(directory)?;
        let appender = tracing_appender::rolling::never(directory, file_name);

        if config.json_format {
            registry
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(appender)
                        .with_target(config.include_targets),
                )
                .try_init()?;
        } else {
            registry
                .with(
                    fmt::layer()
                        .with_writer(appender)
                        .with_ansi(false)
                        .with_target(config.include_targets),
                )
                .try_init()?;
        }
        return Ok(());
    }

    if config.json_format {
        registry
            .with(fmt::layer().json().with_target(config.include_targets))
            .try_init()?;
    } else if config.pretty_format {
        registry
            .with(fmt::layer().pretty().with_target(config.include_targets))
            .try_init()?;
    } else {
        registry
            .with(fmt::layer().compact().with_target(config.include_targets))
            .try_init()?;
    }

    Ok(())
}

/// Initialize logging with default configuration
pub fn init_default_logging() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init_logging(&LoggingConfig::default())
}
