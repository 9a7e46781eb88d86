//! Custom validators and whole-config checks.

use crate::schema::Config;
use std::collections::HashSet;
use validator::{Validate, ValidationError, ValidationErrors};

/// Validate file path (basic check for valid path characters)
pub fn validate_path(path: &str) -> Result<(), ValidationError> {
    if path.trim().is_empty() {
        return Err(ValidationError::new("empty_path"));
    }

    // Colon stays allowed for Windows drive letters
    let invalid_chars = ['<', '>', '"', '|', '?', '*'];
    if path.chars().any(|c| invalid_chars.contains(&c)) {
        return Err(ValidationError::new("invalid_path_characters"));
    }

    Ok(())
}

/// Validate that a URL parses and uses http or https
pub fn validate_http_url(raw: &str) -> Result<(), ValidationError> {
    match url::Url::parse(raw) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(()),
        Ok(_) => Err(ValidationError::new("unsupported_url_scheme")),
        Err(_) => Err(ValidationError::new("invalid_url")),
    }
}

/// Validate a tracing level or filter directive list
pub fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    let valid = level.split(',').all(|directive| {
        let level = directive.rsplit('=').next().unwrap_or_default().trim();
        matches!(level, "trace" | "debug" | "info" | "warn" | "error" | "off")
    });
    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_log_level"))
    }
}

/// Validate that the padding sentinel can sit on a logarithmic axis
pub fn validate_sentinel(sentinel: f64) -> Result<(), ValidationError> {
    if sentinel.is_finite() && sentinel > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::new("sentinel_not_positive"))
    }
}

impl Config {
    /// Comprehensive validation of the entire configuration
    pub fn validate_all(&self) -> Result<(), ValidationErrors> {
        let mut errors = match self.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };

        if let Err(error) = validate_sentinel(self.padding.sentinel) {
            errors.add("padding", error);
        }

        if let Err(error) = validate_log_level(&self.logging.level) {
            errors.add("logging", error);
        }

        let mut seen = HashSet::new();
        if self.reports.disabled.iter().any(|id| !seen.insert(id.as_str())) {
            errors.add("reports", ValidationError::new("duplicate_report_id"));
        }

        if errors.errors().is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_path() {
        assert!(validate_path("data/orders.parquet").is_ok());
        assert!(validate_path("C:\\data\\orders.csv").is_ok());
        assert!(validate_path("").is_err());
        assert!(validate_path("orders?.csv").is_err());
    }

    #[test]
    fn test_validate_http_url() {
        assert!(validate_http_url("https://example.com/brazil.geojson").is_ok());
        assert!(validate_http_url("ftp://example.com/brazil.geojson").is_err());
        assert!(validate_http_url("not a url").is_err());
    }

    #[test]
    fn test_validate_log_level() {
        assert!(validate_log_level("info").is_ok());
        assert!(validate_log_level("orderlens_graphs=debug,warn").is_ok());
        assert!(validate_log_level("loud").is_err());
    }

    #[test]
    fn test_validate_sentinel() {
        assert!(validate_sentinel(1.0).is_ok());
        assert!(validate_sentinel(0.5).is_ok());
        assert!(validate_sentinel(0.0).is_err());
        assert!(validate_sentinel(-1.0).is_err());
        assert!(validate_sentinel(f64::NAN).is_err());
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate_all().is_ok());
    }

    #[test]
    fn test_validate_all_collects_custom_failures() {
        let mut config = Config::default();
        config.padding.sentinel = 0.0;
        config.reports.disabled = vec!["fig1".to_string(), "fig1".to_string()];
        config.geometry.timeout_seconds = 0;

        let errors = config.validate_all().unwrap_err();
        let fields = errors.errors();
        assert!(fields.contains_key("padding"));
        assert!(fields.contains_key("reports"));
        assert!(fields.contains_key("geometry"));
    }
}
