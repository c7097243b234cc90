use serde::Deserialize;
use std::collections::HashMap;

use super::ApiError;
use crate::domain::LocationId;

/// Location reference sent by clients for weather and meetup lookups.
///
/// Coordinates are accepted for compatibility with existing clients; the
/// lookup uses the coordinates stored for `id`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LocationRef {
    pub id: LocationId,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

pub fn validate_search_query(query: &str) -> Result<&str, ApiError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("Search query cannot be empty"));
    }
    if trimmed.chars().count() > 200 {
        return Err(ApiError::validation(
            "Search query must be 200 characters or less",
        ));
    }
    Ok(trimmed)
}

pub fn validate_location_id(id: LocationId) -> Result<LocationId, ApiError> {
    if id.value() <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid location ID: {id}. ID must be a positive integer"
        )));
    }
    Ok(id)
}

/// Reads the `data` query parameter of a location lookup.
pub fn location_query(params: &HashMap<String, String>) -> Result<&str, ApiError> {
    let data = params
        .get("data")
        .ok_or_else(|| ApiError::validation("Missing 'data' query parameter"))?;
    validate_search_query(data)
}

/// Reads the location reference of a weather or meetups lookup.
///
/// Accepts `data=<json>` as well as the bracketed form form-encoding
/// clients produce for nested objects (`data[id]=1&data[latitude]=...`).
pub fn location_ref(params: &HashMap<String, String>) -> Result<LocationRef, ApiError> {
    let location = if let Some(json) = params.get("data") {
        serde_json::from_str::<LocationRef>(json)
            .map_err(|e| ApiError::validation(format!("Invalid 'data' parameter: {e}")))?
    } else if let Some(id) = params.get("data[id]") {
        let id = id
            .trim()
            .parse::<i32>()
            .map_err(|_| ApiError::validation(format!("Invalid location ID: {id}")))?;
        let coordinate = |key: &str| params.get(key).and_then(|v| v.trim().parse().ok());

        LocationRef {
            id: LocationId::new(id.max(0)),
            latitude: coordinate("data[latitude]"),
            longitude: coordinate("data[longitude]"),
        }
    } else {
        return Err(ApiError::validation("Missing 'data' query parameter"));
    };

    validate_location_id(location.id)?;
    Ok(location)
}
