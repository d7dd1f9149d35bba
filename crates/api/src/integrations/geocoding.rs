//! HTTP client for a Nominatim-compatible geocoding endpoint.
//!
//! Lookups never fail from the caller's point of view: any transport,
//! status or parse problem is logged and reported as an unresolved result.

use std::time::Duration;

use estate_core::geocoding::GeocodeResult;
use serde::Deserialize;

/// Upper bound on a single lookup.
const LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors from the geocoding HTTP layer.
#[derive(Debug, thiserror::Error)]
pub enum GeocodingError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("Geocoder returned status {status}")]
    Status { status: u16 },

    /// A coordinate in the answer was not a number.
    #[error("Malformed coordinate '{0}'")]
    Coordinate(String),
}

/// One entry of a Nominatim `format=jsonv2` answer.
///
/// Coordinates arrive as strings.
#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
    display_name: Option<String>,
    importance: Option<f64>,
}

/// Geocoding client. With no endpoint configured every lookup is unresolved.
pub struct GeocodingClient {
    client: reqwest::Client,
    base_url: Option<String>,
}

impl GeocodingClient {
    pub fn new(base_url: Option<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.map(|u| u.trim_end_matches('/').to_string()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.base_url.is_some()
    }

    /// Resolve a normalized address query.
    pub async fn lookup(&self, query: &str) -> GeocodeResult {
        let Some(base_url) = &self.base_url else {
            return GeocodeResult::unresolved(query);
        };

        match self.search(base_url, query).await {
            Ok(Some(result)) => result,
            Ok(None) => {
                tracing::debug!(query, "Geocoder found no match");
                GeocodeResult::unresolved(query)
            }
            Err(e) => {
                tracing::warn!(query, error = %e, "Geocoding lookup failed");
                GeocodeResult::unresolved(query)
            }
        }
    }

    async fn search(
        &self,
        base_url: &str,
        query: &str,
    ) -> Result<Option<GeocodeResult>, GeocodingError> {
        let response = self
            .client
            .get(format!("{base_url}/search"))
            .query(&[("q", query), ("format", "jsonv2"), ("limit", "1")])
            .timeout(LOOKUP_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodingError::Status {
                status: status.as_u16(),
            });
        }

        let places: Vec<Place> = response.json().await?;
        let Some(place) = places.into_iter().next() else {
            return Ok(None);
        };

        let latitude: f64 = place
            .lat
            .parse()
            .map_err(|_| GeocodingError::Coordinate(place.lat.clone()))?;
        let longitude: f64 = place
            .lon
            .parse()
            .map_err(|_| GeocodingError::Coordinate(place.lon.clone()))?;

        Ok(Some(GeocodeResult::resolved(
            query,
            latitude,
            longitude,
            place.display_name,
            place.importance.unwrap_or(0.5),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_client_is_unresolved() {
        let client = GeocodingClient::new(None);
        assert!(!client.is_configured());
        let result = client.lookup("Av. Larco 123, Miraflores").await;
        assert_eq!(result, GeocodeResult::unresolved("Av. Larco 123, Miraflores"));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_unresolved() {
        // Port 9 (discard) on localhost is expected to refuse connections.
        let client = GeocodingClient::new(Some("http://127.0.0.1:9/".into()));
        let result = client.lookup("Lima").await;
        assert_eq!(result.confidence, 0.0);
        assert!(result.latitude.is_none());
    }
}
