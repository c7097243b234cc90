//! Outbound clients for the geocoding, forecast and events providers.

pub mod events;
pub mod forecast;
pub mod geocode;

use reqwest::Client;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::ProvidersConfig;
use crate::domain::Coordinates;
use events::{EventsClient, UpcomingEvent};
use forecast::{ForecastClient, ForecastReport};
use geocode::{GeocodeClient, GeocodeResult};

/// Failure talking to a provider. Callers treat every variant the same way.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("provider rejected request: {0}")]
    Rejected(String),
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ProviderError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::Status {
            status: status.as_u16(),
            body,
        });
    }

    Ok(response.json().await?)
}

/// The three upstream providers behind one seam.
///
/// The lookup service only depends on this trait, so tests can count and
/// script provider calls without a network.
#[async_trait::async_trait]
pub trait ExternalProviders: Send + Sync {
    async fn geocode(&self, query: &str) -> Result<Vec<GeocodeResult>, ProviderError>;

    async fn forecast(&self, at: Coordinates) -> Result<ForecastReport, ProviderError>;

    async fn events(&self, at: Coordinates) -> Result<Vec<UpcomingEvent>, ProviderError>;
}

/// Production [`ExternalProviders`] backed by reqwest.
pub struct HttpProviders {
    geocode: GeocodeClient,
    forecast: ForecastClient,
    events: EventsClient,
    events_page_size: u32,
}

impl HttpProviders {
    #[must_use]
    pub fn new(client: &Client, config: &ProvidersConfig) -> Self {
        Self {
            geocode: GeocodeClient::with_shared_client(client.clone(), config.geocode.clone()),
            forecast: ForecastClient::with_shared_client(client.clone(), config.forecast.clone()),
            events: EventsClient::with_shared_client(client.clone(), config.events.clone()),
            events_page_size: config.events_page_size,
        }
    }
}

fn record_call<T>(provider: &'static str, result: &Result<T, ProviderError>) {
    let outcome = if result.is_ok() { "success" } else { "error" };
    metrics::counter!("provider_requests_total", "provider" => provider, "outcome" => outcome)
        .increment(1);
}

#[async_trait::async_trait]
impl ExternalProviders for HttpProviders {
    async fn geocode(&self, query: &str) -> Result<Vec<GeocodeResult>, ProviderError> {
        let result = self.geocode.geocode(query).await;
        record_call("geocode", &result);
        result
    }

    async fn forecast(&self, at: Coordinates) -> Result<ForecastReport, ProviderError> {
        let result = self.forecast.daily(at).await;
        record_call("forecast", &result);
        result
    }

    async fn events(&self, at: Coordinates) -> Result<Vec<UpcomingEvent>, ProviderError> {
        let result = self.events.upcoming(at, self.events_page_size).await;
        record_call("events", &result);
        result
    }
}
