use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub providers: ProvidersConfig,

    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    /// Maximum database connections (default: 5)
    pub max_db_connections: u32,

    /// Minimum database connections (default: 1)
    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:data/city-explorer.db".to_string(),
            log_level: "info".to_string(),
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,

    /// Allowed CORS origins. A single `*` allows any origin.
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 4000,
            cors_allowed_origins: vec!["*".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub geocode: ProviderEndpoint,

    pub forecast: ProviderEndpoint,

    pub events: ProviderEndpoint,

    /// Number of events requested per meetups lookup
    pub events_page_size: u32,

    /// Request timeout in seconds (default: 30)
    pub request_timeout_seconds: u32,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            geocode: ProviderEndpoint::new("https://maps.googleapis.com/maps/api/geocode/json"),
            forecast: ProviderEndpoint::new("https://api.darksky.net/forecast"),
            events: ProviderEndpoint::new("https://api.meetup.com/find/upcoming_events"),
            events_page_size: 20,
            request_timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderEndpoint {
    pub base_url: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub api_key: String,
}

impl ProviderEndpoint {
    fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            api_key: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,

    pub loki_enabled: bool,

    pub loki_url: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
            loki_enabled: false,
            loki_url: "http://localhost:3100".to_string(),
        }
    }
}

impl Config {
    /// Loads the first config file found, then applies `.env` and process
    /// environment overrides.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = Self::load_file()?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn load_file() -> Result<Self> {
        for path in Self::config_paths() {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(&path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Overrides file values with the variables the deployment environment
    /// traditionally provides. Blank values are ignored.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get("DATABASE_URL") {
            self.general.database_path = url;
        }

        if let Some(port) = get("PORT").and_then(|p| p.trim().parse().ok()) {
            self.server.port = port;
        }

        if let Some(key) = get("GEOCODE_API_KEY") {
            self.providers.geocode.api_key = key;
        }

        if let Some(key) = get("WEATHER_API_KEY") {
            self.providers.forecast.api_key = key;
        }

        if let Some(key) = get("MEETUP_API_KEY") {
            self.providers.events.api_key = key;
        }
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("city-explorer").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".city-explorer").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            Self::default().save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.general.database_path.starts_with("sqlite:") {
            anyhow::bail!(
                "Unsupported database URL '{}': only sqlite: URLs are supported",
                self.general.database_path
            );
        }

        let endpoints = [
            ("geocode", &self.providers.geocode),
            ("forecast", &self.providers.forecast),
            ("events", &self.providers.events),
        ];

        for (name, endpoint) in endpoints {
            if endpoint.base_url.is_empty() {
                anyhow::bail!("Provider '{name}' base URL cannot be empty");
            }
            if endpoint.api_key.is_empty() {
                tracing::warn!("No API key configured for provider '{name}'");
            }
        }

        if self.providers.events_page_size == 0 {
            anyhow::bail!("Events page size must be > 0");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.providers.events_page_size, 20);
        assert!(config.providers.geocode.base_url.contains("geocode"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [providers.events]
            base_url = "http://localhost:9000/events"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.providers.events.base_url, "http://localhost:9000/events");

        assert_eq!(config.server.port, 4000);
        assert_eq!(config.providers.events_page_size, 20);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("DATABASE_URL", "sqlite:/tmp/explorer.db"),
            ("PORT", "8080"),
            ("GEOCODE_API_KEY", "geo-key"),
            ("WEATHER_API_KEY", ""),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_env_overrides(|k| env.get(k).map(ToString::to_string));

        assert_eq!(config.general.database_path, "sqlite:/tmp/explorer.db");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.providers.geocode.api_key, "geo-key");
        assert!(config.providers.forecast.api_key.is_empty());
    }

    #[test]
    fn test_validate_rejects_empty_base_url() {
        let mut config = Config::default();
        config.providers.forecast.base_url.clear();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.providers.events_page_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_non_sqlite_database() {
        let mut config = Config::default();
        config.apply_env_overrides(|k| {
            (k == "DATABASE_URL").then(|| "postgres://user:pw@localhost/city".to_string())
        });

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("postgres://user:pw@localhost/city"));

        config.general.database_path = "sqlite::memory:".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_api_keys_not_serialized_when_empty() {
        let toml_str = toml::to_string_pretty(&Config::default()).unwrap();
        assert!(toml_str.contains("[providers.geocode]"));
        assert!(!toml_str.contains("api_key"));
    }
}
