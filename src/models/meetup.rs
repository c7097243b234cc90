use serde::{Deserialize, Serialize};

use super::{NormalizeError, format_calendar_day_millis};
use crate::clients::events::UpcomingEvent;
use crate::domain::LocationId;

/// An upcoming event cached for a location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetupEntry {
    pub id: i32,
    pub link: String,
    pub name: String,
    pub creation_date: String,
    pub host: String,
    pub location_id: LocationId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMeetupEntry {
    pub link: String,
    pub name: String,
    pub creation_date: String,
    pub host: String,
}

impl NewMeetupEntry {
    pub fn from_event(event: &UpcomingEvent) -> Result<Self, NormalizeError> {
        let link = event
            .link
            .clone()
            .ok_or(NormalizeError::MissingField("events.link"))?;
        let group = event
            .group
            .as_ref()
            .ok_or(NormalizeError::MissingField("events.group"))?;
        let name = group
            .name
            .clone()
            .ok_or(NormalizeError::MissingField("events.group.name"))?;
        let created = group
            .created
            .ok_or(NormalizeError::MissingField("events.group.created"))?;
        let host = group
            .who
            .clone()
            .ok_or(NormalizeError::MissingField("events.group.who"))?;

        Ok(Self {
            link,
            name,
            creation_date: format_calendar_day_millis(created)?,
            host,
        })
    }
}
