//! Domain service for the cache-aside lookups.
//!
//! Every lookup follows the same path: query the cache table by key, return
//! the rows on a hit, otherwise fetch from the provider, normalize, persist
//! and return what was stored.

use std::fmt;
use std::future::Future;

use thiserror::Error;
use tracing::debug;

use crate::clients::ProviderError;
use crate::db::CacheTable;
use crate::domain::{LocationId, RecordKind};
use crate::models::{LocationRecord, MeetupEntry, NormalizeError, WeatherEntry};

/// Domain errors for lookups. Each failure is scoped to one request.
#[derive(Debug, Clone, Error)]
pub enum LookupError {
    #[error("{provider} fetch failed: {message}")]
    UpstreamFetchFailed {
        provider: &'static str,
        message: String,
    },

    #[error("{provider} returned no results")]
    NoResultsFound { provider: &'static str },

    #[error("malformed {kind} result: {source}")]
    MalformedResult {
        kind: RecordKind,
        #[source]
        source: NormalizeError,
    },

    #[error("Database error: {0}")]
    Store(String),

    #[error("Location {0} not found")]
    UnknownLocation(LocationId),
}

impl LookupError {
    pub fn upstream(provider: &'static str, err: &ProviderError) -> Self {
        Self::UpstreamFetchFailed {
            provider,
            message: err.to_string(),
        }
    }

    pub const fn malformed(kind: RecordKind, source: NormalizeError) -> Self {
        Self::MalformedResult { kind, source }
    }

    pub fn store(err: impl fmt::Display) -> Self {
        Self::Store(err.to_string())
    }
}

/// Resolves records by key, going to the providers only on a cache miss.
///
/// # Examples
///
/// ```rust,ignore
/// use city_explorer::services::{LookupError, LookupService};
/// use std::sync::Arc;
///
/// async fn example(service: Arc<dyn LookupService>) -> Result<(), LookupError> {
///     let seattle = service.resolve_location("Seattle").await?;
///     let _forecast = service.resolve_weather(seattle.id).await?;
///     Ok(())
/// }
/// ```
#[async_trait::async_trait]
pub trait LookupService: Send + Sync {
    /// Resolves a free-text search query to its location row.
    ///
    /// # Errors
    ///
    /// - [`LookupError::UpstreamFetchFailed`] if geocoding fails on a miss
    /// - [`LookupError::NoResultsFound`] if the query geocodes to nothing
    /// - [`LookupError::MalformedResult`] if the first result is incomplete
    /// - [`LookupError::Store`] on database failures
    async fn resolve_location(&self, query: &str) -> Result<LocationRecord, LookupError>;

    /// Resolves the daily forecast cached for a location.
    ///
    /// # Errors
    ///
    /// Same as [`LookupService::resolve_location`], plus
    /// [`LookupError::UnknownLocation`] when a miss refers to a location id
    /// the store does not hold.
    async fn resolve_weather(&self, location_id: LocationId)
    -> Result<Vec<WeatherEntry>, LookupError>;

    /// Resolves the upcoming meetups cached for a location.
    ///
    /// # Errors
    ///
    /// Same as [`LookupService::resolve_weather`].
    async fn resolve_meetups(&self, location_id: LocationId)
    -> Result<Vec<MeetupEntry>, LookupError>;
}

/// The cache-aside routine shared by all record kinds.
///
/// `fetch` runs only on a miss and must return normalized rows. An empty
/// fetch is reported as [`LookupError::NoResultsFound`] and nothing is
/// written.
pub async fn lookup_or_fetch<T, F, Fut>(
    kind: RecordKind,
    provider: &'static str,
    table: &T,
    key: &T::Key,
    fetch: F,
) -> Result<Vec<T::Record>, LookupError>
where
    T: CacheTable,
    T::Key: fmt::Debug,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<T::New>, LookupError>>,
{
    let cached = table.query_by_key(key).await.map_err(LookupError::store)?;
    if !cached.is_empty() {
        metrics::counter!("lookup_cache_total", "kind" => kind.as_str(), "outcome" => "hit")
            .increment(1);
        debug!(kind = %kind, key = ?key, rows = cached.len(), "Cache hit");
        return Ok(cached);
    }

    metrics::counter!("lookup_cache_total", "kind" => kind.as_str(), "outcome" => "miss")
        .increment(1);
    debug!(kind = %kind, key = ?key, "Cache miss, fetching from {}", provider);

    let fresh = fetch().await?;
    if fresh.is_empty() {
        return Err(LookupError::NoResultsFound { provider });
    }

    table
        .insert(key, &fresh)
        .await
        .map_err(LookupError::store)
}
