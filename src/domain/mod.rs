//! Domain primitives shared by the store, the lookup service and the API.
//!
//! Identifiers use the newtype pattern so a location id cannot be confused
//! with the row id of a weather or meetup entry.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Store-assigned identifier of a location row.
///
/// This is the owning identifier that scopes weather and meetup rows.
///
/// # Examples
///
/// ```rust
/// use city_explorer::domain::LocationId;
///
/// let id = LocationId::new(42);
/// assert_eq!(id.value(), 42);
/// assert_eq!(id.to_string(), "42");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct LocationId(i32);

impl LocationId {
    /// Creates a new `LocationId` from a raw i32 value.
    ///
    /// # Panics
    ///
    /// Panics in debug mode if `id` is negative. Production code should validate
    /// before construction.
    #[must_use]
    pub const fn new(id: i32) -> Self {
        debug_assert!(id >= 0, "LocationId should be non-negative");
        Self(id)
    }

    /// Returns the underlying i32 value.
    #[must_use]
    pub const fn value(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<LocationId> for i32 {
    fn from(id: LocationId) -> Self {
        id.0
    }
}

impl From<i32> for LocationId {
    fn from(id: i32) -> Self {
        Self::new(id)
    }
}

impl Serialize for LocationId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_i32(self.0)
    }
}

impl<'de> Deserialize<'de> for LocationId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let id = i32::deserialize(deserializer)?;
        if id < 0 {
            return Err(serde::de::Error::custom(format!(
                "location id must be non-negative, got {id}"
            )));
        }
        Ok(Self::new(id))
    }
}

/// Latitude/longitude pair sent to the forecast and events providers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// The three cached record kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Location,
    Weather,
    Meetup,
}

impl RecordKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Location => "location",
            Self::Weather => "weather",
            Self::Meetup => "meetup",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
