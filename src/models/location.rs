use serde::{Deserialize, Serialize};

use super::NormalizeError;
use crate::clients::geocode::GeocodeResult;
use crate::domain::{Coordinates, LocationId};

/// A geocoded search query as stored in the `locations` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub id: LocationId,
    pub search_query: String,
    pub formatted_query: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl LocationRecord {
    #[must_use]
    pub const fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}

/// A location ready to be inserted; the store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLocation {
    pub search_query: String,
    pub formatted_query: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl NewLocation {
    pub fn from_geocode(query: &str, raw: &GeocodeResult) -> Result<Self, NormalizeError> {
        let formatted_query = raw
            .formatted_address
            .clone()
            .ok_or(NormalizeError::MissingField("formatted_address"))?;

        let position = raw
            .geometry
            .as_ref()
            .and_then(|g| g.location)
            .ok_or(NormalizeError::MissingField("geometry.location"))?;

        Ok(Self {
            search_query: query.to_string(),
            formatted_query,
            latitude: position.lat,
            longitude: position.lng,
        })
    }
}
