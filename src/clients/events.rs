use reqwest::Client;
use serde::Deserialize;

use super::{ProviderError, read_json};
use crate::config::ProviderEndpoint;
use crate::domain::Coordinates;

#[derive(Debug, Deserialize)]
struct UpcomingEventsResponse {
    #[serde(default)]
    events: Vec<UpcomingEvent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpcomingEvent {
    pub link: Option<String>,
    pub group: Option<EventGroup>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventGroup {
    pub name: Option<String>,
    /// Group creation time in epoch milliseconds
    pub created: Option<i64>,
    pub who: Option<String>,
}

#[derive(Clone)]
pub struct EventsClient {
    client: Client,
    endpoint: ProviderEndpoint,
}

impl EventsClient {
    #[must_use]
    pub const fn with_shared_client(client: Client, endpoint: ProviderEndpoint) -> Self {
        Self { client, endpoint }
    }

    pub async fn upcoming(
        &self,
        at: Coordinates,
        page_size: u32,
    ) -> Result<Vec<UpcomingEvent>, ProviderError> {
        let url = format!(
            "{}?sign=true&photo-host=public&lat={}&lon={}&page={}&key={}",
            self.endpoint.base_url,
            at.latitude,
            at.longitude,
            page_size,
            urlencoding::encode(&self.endpoint.api_key)
        );

        let response = self.client.get(&url).send().await?;
        let body: UpcomingEventsResponse = read_json(response).await?;

        Ok(body.events)
    }
}
