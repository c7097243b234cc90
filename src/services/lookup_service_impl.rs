//! `SeaORM` implementation of the `LookupService` trait.
//!
//! Lookups for the same key are coalesced through [`SingleFlight`], so two
//! concurrent misses cost one provider call and one insert.

use std::sync::Arc;

use tracing::info;

use crate::clients::ExternalProviders;
use crate::db::Store;
use crate::domain::{LocationId, RecordKind};
use crate::models::{
    LocationRecord, MeetupEntry, NewLocation, NewMeetupEntry, NewWeatherEntry, WeatherEntry,
};
use crate::services::lookup_service::{LookupError, LookupService, lookup_or_fetch};
use crate::services::single_flight::SingleFlight;

type Flights<K, T> = SingleFlight<K, Result<T, LookupError>>;

/// SeaORM-backed [`LookupService`].
pub struct SeaOrmLookupService {
    core: Arc<LookupCore>,
    location_flights: Flights<String, LocationRecord>,
    weather_flights: Flights<LocationId, Vec<WeatherEntry>>,
    meetup_flights: Flights<LocationId, Vec<MeetupEntry>>,
}

impl SeaOrmLookupService {
    #[must_use]
    pub fn new(store: Store, providers: Arc<dyn ExternalProviders>) -> Self {
        Self {
            core: Arc::new(LookupCore { store, providers }),
            location_flights: SingleFlight::new(),
            weather_flights: SingleFlight::new(),
            meetup_flights: SingleFlight::new(),
        }
    }
}

#[async_trait::async_trait]
impl LookupService for SeaOrmLookupService {
    async fn resolve_location(&self, query: &str) -> Result<LocationRecord, LookupError> {
        let core = self.core.clone();
        let query = query.to_string();

        self.location_flights
            .run(query.clone(), move || async move { core.location(&query).await })
            .await
    }

    async fn resolve_weather(
        &self,
        location_id: LocationId,
    ) -> Result<Vec<WeatherEntry>, LookupError> {
        let core = self.core.clone();

        self.weather_flights
            .run(location_id, move || async move { core.weather(location_id).await })
            .await
    }

    async fn resolve_meetups(
        &self,
        location_id: LocationId,
    ) -> Result<Vec<MeetupEntry>, LookupError> {
        let core = self.core.clone();

        self.meetup_flights
            .run(location_id, move || async move { core.meetups(location_id).await })
            .await
    }
}

/// State shared with in-flight lookups, which must outlive the caller that
/// started them.
struct LookupCore {
    store: Store,
    providers: Arc<dyn ExternalProviders>,
}

impl LookupCore {
    async fn location(&self, query: &str) -> Result<LocationRecord, LookupError> {
        let table = self.store.locations();

        let rows = lookup_or_fetch(RecordKind::Location, "geocode", &table, query, move || async move {
            let results = self
                .providers
                .geocode(query)
                .await
                .map_err(|e| LookupError::upstream("geocode", &e))?;

            // Results are ranked; only the best match is cached.
            results
                .iter()
                .take(1)
                .map(|raw| NewLocation::from_geocode(query, raw))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| LookupError::malformed(RecordKind::Location, e))
        })
        .await?;

        let location = rows
            .into_iter()
            .next()
            .ok_or_else(|| LookupError::Store(format!("location '{query}' missing after insert")))?;

        info!(id = %location.id, "Resolved location '{}'", query);
        Ok(location)
    }

    async fn weather(&self, location_id: LocationId) -> Result<Vec<WeatherEntry>, LookupError> {
        let table = self.store.weathers();

        lookup_or_fetch(RecordKind::Weather, "forecast", &table, &location_id, move || async move {
            let location = self.owning_location(location_id).await?;
            let report = self
                .providers
                .forecast(location.coordinates())
                .await
                .map_err(|e| LookupError::upstream("forecast", &e))?;

            report
                .days
                .iter()
                .map(|day| NewWeatherEntry::from_forecast_day(day, report.offset_hours))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| LookupError::malformed(RecordKind::Weather, e))
        })
        .await
    }

    async fn meetups(&self, location_id: LocationId) -> Result<Vec<MeetupEntry>, LookupError> {
        let table = self.store.meetups();

        lookup_or_fetch(RecordKind::Meetup, "events", &table, &location_id, move || async move {
            let location = self.owning_location(location_id).await?;
            let events = self
                .providers
                .events(location.coordinates())
                .await
                .map_err(|e| LookupError::upstream("events", &e))?;

            events
                .iter()
                .map(NewMeetupEntry::from_event)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| LookupError::malformed(RecordKind::Meetup, e))
        })
        .await
    }

    /// Provider coordinates always come from the stored location, never from
    /// the caller.
    async fn owning_location(&self, id: LocationId) -> Result<LocationRecord, LookupError> {
        self.store
            .locations()
            .get(id)
            .await
            .map_err(LookupError::store)?
            .ok_or(LookupError::UnknownLocation(id))
    }
}
