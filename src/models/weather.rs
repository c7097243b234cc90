use serde::{Deserialize, Serialize};

use super::{NormalizeError, format_calendar_day};
use crate::clients::forecast::ForecastDay;
use crate::domain::LocationId;

/// One forecast day cached for a location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherEntry {
    pub id: i32,
    pub forecast: String,
    pub time: String,
    pub location_id: LocationId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWeatherEntry {
    pub forecast: String,
    pub time: String,
}

impl NewWeatherEntry {
    pub fn from_forecast_day(
        day: &ForecastDay,
        offset_hours: Option<f64>,
    ) -> Result<Self, NormalizeError> {
        let forecast = day
            .summary
            .clone()
            .ok_or(NormalizeError::MissingField("daily.data.summary"))?;
        let timestamp = day
            .time
            .ok_or(NormalizeError::MissingField("daily.data.time"))?;

        Ok(Self {
            forecast,
            time: format_calendar_day(timestamp, offset_hours)?,
        })
    }
}
