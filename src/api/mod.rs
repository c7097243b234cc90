use axum::{Router, http::HeaderValue, middleware, routing::get};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::clients::ExternalProviders;
use crate::config::Config;
use crate::services::LookupService;
use crate::state::SharedState;

mod error;
mod lookups;
mod observability;
mod system;
mod types;
pub mod validation;

pub use error::{ApiError, GENERIC_ERROR_BODY};
pub use types::*;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Arc<RwLock<Config>> {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn lookup_service(&self) -> &Arc<dyn LookupService> {
        &self.shared.lookup_service
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

/// Builds the app state around a custom provider implementation.
pub async fn create_app_state_with_providers(
    config: Config,
    providers: Arc<dyn ExternalProviders>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::with_providers(config, providers).await?);
    Ok(create_app_state(shared, None))
}

pub async fn router(state: Arc<AppState>) -> Router {
    let (cors_origins, metrics_enabled) = {
        let config = state.config().read().await;
        (
            config.server.cors_allowed_origins.clone(),
            config.observability.metrics_enabled,
        )
    };

    let mut routes = Router::new()
        .route("/location", get(lookups::get_location))
        .route("/weather", get(lookups::get_weather))
        .route("/meetups", get(lookups::get_meetups))
        .route("/health/live", get(system::health_live))
        .route("/health/ready", get(system::health_ready));

    if metrics_enabled {
        routes = routes.route("/metrics", get(observability::get_metrics));
    }

    let cors_layer = if cors_origins.iter().any(|origin| origin == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    routes
        .with_state(state)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::track_metrics))
}
