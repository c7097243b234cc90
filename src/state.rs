use std::sync::Arc;
use tokio::sync::RwLock;

use crate::clients::{ExternalProviders, HttpProviders};
use crate::config::Config;
use crate::db::Store;
use crate::services::{LookupService, SeaOrmLookupService};

/// Build a shared HTTP client with reasonable defaults for API calls.
/// This client is reused by every provider client so connections are pooled.
fn build_shared_http_client(timeout_seconds: u64) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_seconds))
        .user_agent(concat!("city-explorer/", env!("CARGO_PKG_VERSION")))
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub lookup_service: Arc<dyn LookupService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let http_client =
            build_shared_http_client(config.providers.request_timeout_seconds.into())?;
        let providers: Arc<dyn ExternalProviders> =
            Arc::new(HttpProviders::new(&http_client, &config.providers));

        Self::with_providers(config, providers).await
    }

    /// Builds the state around an existing provider implementation.
    pub async fn with_providers(
        config: Config,
        providers: Arc<dyn ExternalProviders>,
    ) -> anyhow::Result<Self> {
        let store = Store::from_config(&config.general).await?;

        let lookup_service: Arc<dyn LookupService> =
            Arc::new(SeaOrmLookupService::new(store.clone(), providers));

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            store,
            lookup_service,
        })
    }
}
