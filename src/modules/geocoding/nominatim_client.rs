use async_trait::async_trait;
use serde::Deserialize;

use super::{GeocodeMatch, Geocoder};
use crate::core::config::GeocodingConfig;
use crate::core::error::{AppError, Result};

/// Nominatim API response structure
#[derive(Debug, Deserialize)]
pub struct NominatimResponse {
    pub lat: String,
    pub lon: String,
    pub display_name: String,
}

impl NominatimResponse {
    fn into_match(self) -> Option<GeocodeMatch> {
        let lat = self.lat.parse::<f64>().ok()?;
        let lng = self.lon.parse::<f64>().ok()?;
        Some(GeocodeMatch {
            lat,
            lng,
            display_name: self.display_name,
        })
    }
}

/// Client for the Nominatim free-form search endpoint
pub struct NominatimClient {
    client: reqwest::Client,
    base_url: String,
}

impl NominatimClient {
    pub fn new(config: &GeocodingConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Execute HTTP request to Nominatim and parse response
    async fn execute_request(&self, url: &str) -> Result<Option<NominatimResponse>> {
        let response = self.client.get(url).send().await.map_err(|e| {
            tracing::error!("Nominatim request failed: {:?}", e);
            AppError::ExternalServiceError(format!("Nominatim request failed: {}", e))
        })?;

        if !response.status().is_success() {
            tracing::warn!("Nominatim returned status: {}", response.status());
            return Err(AppError::ExternalServiceError(format!(
                "Nominatim returned status {}",
                response.status()
            )));
        }

        let results: Vec<NominatimResponse> = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse Nominatim response: {:?}", e);
            AppError::ExternalServiceError(format!("Failed to parse Nominatim response: {}", e))
        })?;

        Ok(results.into_iter().next())
    }
}

#[async_trait]
impl Geocoder for NominatimClient {
    async fn search(&self, query: &str) -> Result<Option<GeocodeMatch>> {
        let url = format!(
            "{}/search?format=json&q={}&limit=1",
            self.base_url,
            urlencoding::encode(query)
        );

        tracing::debug!("Geocoding: {} -> {}", query, url);

        Ok(self.execute_request(&url).await?.and_then(|r| r.into_match()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> NominatimClient {
        NominatimClient::new(&GeocodingConfig {
            base_url: server.uri(),
            user_agent: "EcolinkTest/1.0".to_string(),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_search_returns_first_match() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "Rizal Park, Manila"))
            .and(query_param("format", "json"))
            .and(query_param("limit", "1"))
            .and(header("user-agent", "EcolinkTest/1.0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"lat": "14.5831", "lon": "120.9794", "display_name": "Rizal Park, Ermita, Manila"},
                {"lat": "0", "lon": "0", "display_name": "ignored"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let found = client_for(&server)
            .search("Rizal Park, Manila")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(found.lat, 14.5831);
        assert_eq!(found.lng, 120.9794);
        assert_eq!(found.display_name, "Rizal Park, Ermita, Manila");
    }

    #[tokio::test]
    async fn test_search_without_results_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        assert!(client_for(&server).search("nowhere at all").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_search_maps_upstream_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = client_for(&server).search("Quezon City").await.unwrap_err();
        assert!(matches!(err, AppError::ExternalServiceError(_)));
    }

    #[tokio::test]
    async fn test_unparseable_coordinates_are_skipped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"lat": "north", "lon": "120.9", "display_name": "Broken"}
            ])))
            .mount(&server)
            .await;

        assert!(client_for(&server).search("Broken").await.unwrap().is_none());
    }
}
