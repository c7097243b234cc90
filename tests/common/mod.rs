#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use city_explorer::clients::events::{EventGroup, UpcomingEvent};
use city_explorer::clients::forecast::{ForecastDay, ForecastReport};
use city_explorer::clients::geocode::{GeocodeResult, Geometry, LatLng};
use city_explorer::clients::{ExternalProviders, ProviderError};
use city_explorer::config::Config;
use city_explorer::db::Store;
use city_explorer::domain::Coordinates;
use parking_lot::Mutex;

/// Scripted providers that count how often each one is called.
#[derive(Default)]
pub struct FakeProviders {
    pub geocode_results: Mutex<Vec<GeocodeResult>>,
    pub forecast_report: Mutex<ForecastReport>,
    pub events: Mutex<Vec<UpcomingEvent>>,
    pub fail_with_status: Mutex<Option<u16>>,
    pub delay: Mutex<Option<Duration>>,
    pub geocode_calls: AtomicUsize,
    pub forecast_calls: AtomicUsize,
    pub events_calls: AtomicUsize,
    pub last_coordinates: Mutex<Option<Coordinates>>,
}

impl FakeProviders {
    pub fn seattle() -> Arc<Self> {
        let providers = Self::default();
        *providers.geocode_results.lock() = vec![geocode_result("Seattle, WA, USA", 47.6, -122.33)];
        *providers.forecast_report.lock() = ForecastReport {
            offset_hours: Some(-8.0),
            days: vec![
                forecast_day("Light rain in the morning.", 1_705_305_600),
                forecast_day("Mostly cloudy throughout the day.", 1_705_392_000),
                forecast_day("Clear throughout the day.", 1_705_478_400),
            ],
        };
        *providers.events.lock() = vec![
            event("https://www.meetup.com/seattle-rust/events/1", "Seattle Rust", "Rustaceans"),
            event("https://www.meetup.com/seattle-hikers/events/2", "Seattle Hikers", "Hikers"),
        ];
        Arc::new(providers)
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = Some(delay);
    }

    pub fn fail_with(&self, status: u16) {
        *self.fail_with_status.lock() = Some(status);
    }

    pub fn calls(&self) -> (usize, usize, usize) {
        (
            self.geocode_calls.load(Ordering::SeqCst),
            self.forecast_calls.load(Ordering::SeqCst),
            self.events_calls.load(Ordering::SeqCst),
        )
    }

    async fn respond<T>(&self, value: T) -> Result<T, ProviderError> {
        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let failure = *self.fail_with_status.lock();
        match failure {
            Some(status) => Err(ProviderError::Status {
                status,
                body: "scripted failure".to_string(),
            }),
            None => Ok(value),
        }
    }
}

#[async_trait::async_trait]
impl ExternalProviders for FakeProviders {
    async fn geocode(&self, _query: &str) -> Result<Vec<GeocodeResult>, ProviderError> {
        self.geocode_calls.fetch_add(1, Ordering::SeqCst);
        let results = self.geocode_results.lock().clone();
        self.respond(results).await
    }

    async fn forecast(&self, at: Coordinates) -> Result<ForecastReport, ProviderError> {
        self.forecast_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_coordinates.lock() = Some(at);
        let report = self.forecast_report.lock().clone();
        self.respond(report).await
    }

    async fn events(&self, at: Coordinates) -> Result<Vec<UpcomingEvent>, ProviderError> {
        self.events_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_coordinates.lock() = Some(at);
        let events = self.events.lock().clone();
        self.respond(events).await
    }
}

pub fn geocode_result(address: &str, lat: f64, lng: f64) -> GeocodeResult {
    GeocodeResult {
        formatted_address: Some(address.to_string()),
        geometry: Some(Geometry {
            location: Some(LatLng { lat, lng }),
        }),
    }
}

pub fn forecast_day(summary: &str, time: i64) -> ForecastDay {
    ForecastDay {
        summary: Some(summary.to_string()),
        time: Some(time),
    }
}

pub fn event(link: &str, name: &str, who: &str) -> UpcomingEvent {
    UpcomingEvent {
        link: Some(link.to_string()),
        group: Some(EventGroup {
            name: Some(name.to_string()),
            created: Some(1_262_304_000_000),
            who: Some(who.to_string()),
        }),
    }
}

/// A config pointing at a fresh SQLite file under the temp dir.
pub fn test_config() -> Config {
    let path = std::env::temp_dir().join(format!("city-explorer-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", path.display());
    config.observability.metrics_enabled = false;
    config
}

pub async fn test_store(config: &Config) -> Store {
    Store::new(&config.general.database_path)
        .await
        .expect("Failed to open test store")
}
