use reqwest::Client;
use serde::Deserialize;

use super::{ProviderError, read_json};
use crate::config::ProviderEndpoint;

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    results: Vec<GeocodeResult>,
    #[serde(default)]
    status: Option<String>,
}

/// One candidate returned by the geocoding provider.
///
/// Nested fields are optional so a partial result reaches the normalizer
/// instead of failing the whole response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeocodeResult {
    pub formatted_address: Option<String>,
    pub geometry: Option<Geometry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Geometry {
    pub location: Option<LatLng>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Clone)]
pub struct GeocodeClient {
    client: Client,
    endpoint: ProviderEndpoint,
}

impl GeocodeClient {
    #[must_use]
    pub const fn with_shared_client(client: Client, endpoint: ProviderEndpoint) -> Self {
        Self { client, endpoint }
    }

    /// Geocodes a free-text address. An empty vector means the provider had
    /// no match (`ZERO_RESULTS`).
    pub async fn geocode(&self, address: &str) -> Result<Vec<GeocodeResult>, ProviderError> {
        let url = format!(
            "{}?address={}&key={}",
            self.endpoint.base_url,
            urlencoding::encode(address),
            urlencoding::encode(&self.endpoint.api_key)
        );

        let response = self.client.get(&url).send().await?;
        let body: GeocodeResponse = read_json(response).await?;

        // Errors such as REQUEST_DENIED arrive with a 200 status.
        match body.status.as_deref() {
            None | Some("OK" | "ZERO_RESULTS") => {}
            Some(other) => return Err(ProviderError::Rejected(other.to_string())),
        }

        if body.results.is_empty() {
            tracing::debug!(
                status = body.status.as_deref().unwrap_or("unknown"),
                "Geocode returned no results for '{}'",
                address
            );
        }

        Ok(body.results)
    }
}
