use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::store::RemoteOptions;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Memory,
    Remote,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub base_url: Option<String>,
    pub project_id: Option<String>,
    pub public_key: Option<String>,
    pub timeout_secs: u64,
    /// Retries for reads only; writes are sent once.
    pub max_retries: u32,
    /// Artificial delay for the in-memory store.
    pub latency_ms: u64,
    /// Load demo fixtures at startup.
    pub seed: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            base_url: None,
            project_id: None,
            public_key: None,
            timeout_secs: 30,
            max_retries: 2,
            latency_ms: 0,
            seed: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and config file
    pub fn load() -> anyhow::Result<Self> {
        let mut config = config::Config::builder();

        // Add default configuration
        config = config.add_source(config::Config::try_from(&AppConfig::default())?);

        // Add config file if it exists
        config = config.add_source(config::File::with_name("config").required(false));

        // Environment variables like SCHOOL_STORE__BACKEND=remote
        config = config.add_source(
            config::Environment::with_prefix("SCHOOL")
                .prefix_separator("_")
                .separator("__"),
        );

        let config = config.build()?;
        let mut app_config: AppConfig = config.try_deserialize()?;
        app_config.store.apply_env_fallbacks();

        Ok(app_config)
    }

    /// Get the server bind address
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl StoreConfig {
    fn apply_env_fallbacks(&mut self) {
        let fallback = |slot: &mut Option<String>, var: &str| {
            if slot.is_none() {
                *slot = std::env::var(var).ok().filter(|value| !value.is_empty());
            }
        };
        fallback(&mut self.base_url, "RECORD_API_URL");
        fallback(&mut self.project_id, "RECORD_API_PROJECT_ID");
        fallback(&mut self.public_key, "RECORD_API_PUBLIC_KEY");
    }

    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }

    /// Connection settings for the remote store. Fails when no base URL is set.
    pub fn remote_options(&self) -> anyhow::Result<RemoteOptions> {
        let base_url = self.base_url.clone().ok_or_else(|| {
            anyhow::anyhow!("store.base_url (or RECORD_API_URL) is required for the remote backend")
        })?;
        Ok(RemoteOptions {
            project_id: self.project_id.clone(),
            public_key: self.public_key.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            max_retries: self.max_retries,
            ..RemoteOptions::new(base_url)
        })
    }
}
