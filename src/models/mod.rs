//! Cached record shapes and the normalizers that build them from raw
//! provider results.

pub mod location;
pub mod meetup;
pub mod weather;

pub use location::{LocationRecord, NewLocation};
pub use meetup::{MeetupEntry, NewMeetupEntry};
pub use weather::{NewWeatherEntry, WeatherEntry};

use chrono::{DateTime, FixedOffset};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("missing field `{0}` in provider result")]
    MissingField(&'static str),

    #[error("timestamp {0} is out of range")]
    InvalidTimestamp(i64),
}

/// Short calendar-day display format, e.g. `Mon Jan 15 2024`.
pub const CALENDAR_DAY_FORMAT: &str = "%a %b %d %Y";

/// Formats a unix timestamp (seconds) as a calendar day in the given UTC
/// offset. Offsets the provider reports in fractional hours are rounded to
/// the minute; an unusable offset falls back to UTC.
pub fn format_calendar_day(
    timestamp_secs: i64,
    offset_hours: Option<f64>,
) -> Result<String, NormalizeError> {
    let utc = DateTime::from_timestamp(timestamp_secs, 0)
        .ok_or(NormalizeError::InvalidTimestamp(timestamp_secs))?;

    let offset = offset_hours.filter(|h| h.is_finite()).and_then(|h| {
        #[allow(clippy::cast_possible_truncation)]
        let minutes = (h * 60.0).round() as i32;
        FixedOffset::east_opt(minutes.saturating_mul(60))
    });

    let day = match offset {
        Some(offset) => utc.with_timezone(&offset).format(CALENDAR_DAY_FORMAT),
        None => utc.format(CALENDAR_DAY_FORMAT),
    };

    Ok(day.to_string())
}

/// Same as [`format_calendar_day`] for epoch milliseconds, rendered in UTC.
pub fn format_calendar_day_millis(timestamp_millis: i64) -> Result<String, NormalizeError> {
    let utc = DateTime::from_timestamp_millis(timestamp_millis)
        .ok_or(NormalizeError::InvalidTimestamp(timestamp_millis))?;
    Ok(utc.format(CALENDAR_DAY_FORMAT).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_utc_day() {
        assert_eq!(
            format_calendar_day(1_705_276_800, None).unwrap(),
            "Mon Jan 15 2024"
        );
    }

    #[test]
    fn applies_provider_offset() {
        // 03:40 UTC on the 15th is still the evening of the 14th in Seattle.
        assert_eq!(
            format_calendar_day(1_705_290_000, Some(-8.0)).unwrap(),
            "Sun Jan 14 2024"
        );
        assert_eq!(
            format_calendar_day(1_705_290_000, None).unwrap(),
            "Mon Jan 15 2024"
        );
    }

    #[test]
    fn ignores_unusable_offset() {
        assert_eq!(
            format_calendar_day(1_705_276_800, Some(f64::NAN)).unwrap(),
            "Mon Jan 15 2024"
        );
        assert_eq!(
            format_calendar_day(1_705_276_800, Some(400.0)).unwrap(),
            "Mon Jan 15 2024"
        );
    }

    #[test]
    fn formats_millis_and_pads_day() {
        assert_eq!(
            format_calendar_day_millis(1_262_304_000_000).unwrap(),
            "Fri Jan 01 2010"
        );
    }

    #[test]
    fn rejects_out_of_range_timestamp() {
        assert_eq!(
            format_calendar_day(i64::MAX, None),
            Err(NormalizeError::InvalidTimestamp(i64::MAX))
        );
    }
}
