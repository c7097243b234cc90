//! Cache-aside lookup endpoints.
//!
//! Each handler validates the `data` query parameter and hands the key to
//! the lookup service. Responses are the stored rows, serialized as-is.

use axum::{
    Json,
    extract::{Query, State},
};
use std::collections::HashMap;
use std::sync::Arc;

use super::validation::{location_query, location_ref};
use super::{ApiError, AppState};
use crate::models::{LocationRecord, MeetupEntry, WeatherEntry};

/// `GET /location?data=<query>`
pub async fn get_location(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<LocationRecord>, ApiError> {
    let query = location_query(&params)?;
    let location = state.lookup_service().resolve_location(query).await?;
    Ok(Json(location))
}

/// `GET /weather?data=<json:{id,latitude,longitude}>`
pub async fn get_weather(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<WeatherEntry>>, ApiError> {
    let location = location_ref(&params)?;
    let forecast = state.lookup_service().resolve_weather(location.id).await?;
    Ok(Json(forecast))
}

/// `GET /meetups?data=<json:{id,latitude,longitude}>`
pub async fn get_meetups(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<MeetupEntry>>, ApiError> {
    let location = location_ref(&params)?;
    let meetups = state.lookup_service().resolve_meetups(location.id).await?;
    Ok(Json(meetups))
}
