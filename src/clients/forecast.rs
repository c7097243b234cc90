use reqwest::Client;
use serde::Deserialize;

use super::{ProviderError, read_json};
use crate::config::ProviderEndpoint;
use crate::domain::Coordinates;

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    daily: Option<DailyBlock>,
    offset: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct DailyBlock {
    #[serde(default)]
    data: Vec<ForecastDay>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForecastDay {
    pub summary: Option<String>,
    /// Unix timestamp (seconds) of the start of the day
    pub time: Option<i64>,
}

/// Daily forecast for one coordinate pair.
#[derive(Debug, Clone, Default)]
pub struct ForecastReport {
    /// Local UTC offset in hours reported by the provider
    pub offset_hours: Option<f64>,
    pub days: Vec<ForecastDay>,
}

#[derive(Clone)]
pub struct ForecastClient {
    client: Client,
    endpoint: ProviderEndpoint,
}

impl ForecastClient {
    #[must_use]
    pub const fn with_shared_client(client: Client, endpoint: ProviderEndpoint) -> Self {
        Self { client, endpoint }
    }

    pub async fn daily(&self, at: Coordinates) -> Result<ForecastReport, ProviderError> {
        let url = format!(
            "{}/{}/{},{}",
            self.endpoint.base_url.trim_end_matches('/'),
            urlencoding::encode(&self.endpoint.api_key),
            at.latitude,
            at.longitude
        );

        let response = self.client.get(&url).send().await?;
        let body: ForecastResponse = read_json(response).await?;

        Ok(ForecastReport {
            offset_hours: body.offset,
            days: body.daily.map(|d| d.data).unwrap_or_default(),
        })
    }
}
