//! Boundary geometry for the choropleth reports.
//!
//! The GeoJSON document is fetched once per run with a single best-effort
//! request. A failed fetch is not fatal: choropleths render without shapes.

use orderlens_common::{OrderLensError, Result};
use orderlens_config::GeometryConfig;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// A validated GeoJSON `FeatureCollection`.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    document: Value,
}

impl Geometry {
    /// Wraps a parsed document after checking it is a feature collection.
    pub fn from_value(document: Value) -> Result<Self> {
        if document.get("type").and_then(Value::as_str) != Some("FeatureCollection") {
            return Err(OrderLensError::network(
                "geometry document is not a GeoJSON FeatureCollection",
            ));
        }
        if !document.get("features").is_some_and(Value::is_array) {
            return Err(OrderLensError::network("geometry document has no feature list"));
        }
        Ok(Self { document })
    }

    pub fn document(&self) -> &Value {
        &self.document
    }

    pub fn feature_count(&self) -> usize {
        self.document["features"].as_array().map_or(0, Vec::len)
    }
}

/// HTTP client for the boundary document.
#[derive(Debug, Clone)]
pub struct GeometryFetcher {
    client: Client,
    url: String,
}

impl GeometryFetcher {
    pub fn new(config: &GeometryConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| OrderLensError::network_with_source("Failed to create HTTP client", e))?;
        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }

    /// One GET; a non-success status or malformed body is an error.
    #[instrument(skip(self), fields(url = %self.url))]
    pub async fn fetch(&self) -> Result<Geometry> {
        debug!("Requesting boundary geometry");
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(OrderLensError::network(format!(
                "geometry request returned {status}"
            )));
        }

        let document: Value = response.json().await?;
        let geometry = Geometry::from_value(document)?;
        info!(features = geometry.feature_count(), "Boundary geometry downloaded");
        Ok(geometry)
    }

    /// Like [`fetch`](Self::fetch), but logs the failure and yields `None`.
    pub async fn fetch_or_none(&self) -> Option<Geometry> {
        match self.fetch().await {
            Ok(geometry) => Some(geometry),
            Err(e) => {
                warn!(error = %e, "Boundary geometry unavailable; maps will render without shapes");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn collection() -> Value {
        json!({
            "type": "FeatureCollection",
            "features": [
                { "type": "Feature", "properties": { "sigla": "SP", "name": "São Paulo" } },
                { "type": "Feature", "properties": { "sigla": "RJ" } },
                { "type": "Feature", "properties": {} },
            ]
        })
    }

    #[test]
    fn test_accepts_feature_collection() {
        let geometry = Geometry::from_value(collection()).unwrap();
        assert_eq!(geometry.feature_count(), 3);
        assert_eq!(geometry.document()["features"][0]["properties"]["sigla"], "SP");
    }

    #[test]
    fn test_rejects_non_collections() {
        assert!(Geometry::from_value(json!({ "type": "Feature" })).is_err());
        assert!(Geometry::from_value(json!({ "type": "FeatureCollection" })).is_err());
    }

    #[tokio::test]
    async fn test_unreachable_host_yields_none() {
        let config = GeometryConfig {
            url: "http://127.0.0.1:9/brazil-states.geojson".to_string(),
            timeout_seconds: 2,
            ..GeometryConfig::default()
        };
        let fetcher = GeometryFetcher::new(&config).unwrap();
        assert!(fetcher.fetch_or_none().await.is_none());
    }
}
