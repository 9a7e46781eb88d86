//! Configuration loading utilities

use crate::schema::Config;
use orderlens_common::{OrderLensError, Result as OrderLensResult};
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Environment variable naming an explicit configuration file.
pub const CONFIG_PATH_ENV: &str = "ORDERLENS_CONFIG_PATH";

/// Files probed in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILES: [&str; 3] = ["orderlens.yaml", "orderlens.yml", "orderlens.toml"];

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error when reading configuration file
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML configuration: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("Failed to parse TOML configuration: {0}")]
    TomlError(#[from] toml::de::Error),

    /// Configuration file with an extension we cannot read
    #[error("Unsupported configuration format: {0}")]
    UnsupportedFormat(PathBuf),

    /// Configuration validation error
    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    /// Environment variable parsing error
    #[error("Failed to parse environment variable '{var}': {source}")]
    EnvParseError {
        var: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl From<ConfigError> for OrderLensError {
    fn from(err: ConfigError) -> Self {
        OrderLensError::config_with_source(err.to_string(), err)
    }
}

/// Configuration loader for the application
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a YAML or TOML file with environment variable overrides
    pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let path = path.as_ref();
        let mut config = Self::parse_file(path)?;
        info!(path = %path.display(), "Loaded configuration file");

        Self::apply_env_overrides(&mut config)?;
        config.validate_all()?;

        Ok(config)
    }

    /// Load configuration from an explicit path, the environment, or the default files
    pub fn load(explicit: Option<&Path>) -> OrderLensResult<Config> {
        if let Some(path) = Self::resolve_path(explicit) {
            return Ok(Self::load_config(path)?);
        }

        debug!("No configuration file found, using defaults");
        let mut config = Config::default();
        Self::apply_env_overrides(&mut config)?;
        config.validate_all().map_err(ConfigError::ValidationError)?;
        Ok(config)
    }

    /// Picks the configuration file to read, if any.
    fn resolve_path(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }
        if let Ok(path) = env::var(CONFIG_PATH_ENV) {
            return Some(PathBuf::from(path));
        }
        DEFAULT_CONFIG_FILES
            .iter()
            .map(PathBuf::from)
            .find(|candidate| candidate.exists())
    }

    /// Parses a configuration file according to its extension
    pub fn parse_file(path: &Path) -> Result<Config, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml" | "yml") => Ok(serde_yaml::from_str(&content)?),
            Some("toml") => Ok(toml::from_str(&content)?),
            _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    /// Apply environment variable overrides to configuration
    fn apply_env_overrides(config: &mut Config) -> Result<(), ConfigError> {
        if let Ok(path) = env::var("ORDERLENS_INPUT") {
            config.input.path = path;
        }

        if let Ok(directory) = env::var("ORDERLENS_OUTPUT_DIR") {
            config.output.directory = directory;
        }

        if let Ok(url) = env::var("ORDERLENS_GEOJSON_URL") {
            config.geometry.url = url;
        }

        if let Ok(timeout) = env::var("ORDERLENS_GEOJSON_TIMEOUT") {
            config.geometry.timeout_seconds = timeout.parse().map_err(|e| ConfigError::EnvParseError {
                var: "ORDERLENS_GEOJSON_TIMEOUT".to_string(),
                source: Box::new(e),
            })?;
        }

        if let Ok(sentinel) = env::var("ORDERLENS_SENTINEL") {
            config.padding.sentinel = sentinel.parse().map_err(|e| ConfigError::EnvParseError {
                var: "ORDERLENS_SENTINEL".to_string(),
                source: Box::new(e),
            })?;
        }

        if let Ok(level) = env::var("ORDERLENS_LOG_LEVEL") {
            config.logging.level = level;
        }

        Ok(())
    }
}
