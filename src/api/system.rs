//! Health probes.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::{
    ApiResponse, AppState, HealthLiveResponse, HealthReadinessChecks, HealthReadyResponse,
};

/// `GET /health/live`
///
/// Lightweight liveness probe to indicate the API process is running.
pub async fn health_live(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ApiResponse::success(HealthLiveResponse {
        status: "alive",
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    }))
}

/// `GET /health/ready`
///
/// Readiness probe that checks database connectivity.
pub async fn health_ready(State(state): State<Arc<AppState>>) -> Response {
    let db_ready = state.store().ping().await.is_ok();

    let status = if db_ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(ApiResponse::success(HealthReadyResponse {
            ready: db_ready,
            checks: HealthReadinessChecks { database: db_ready },
        })),
    )
        .into_response()
}
