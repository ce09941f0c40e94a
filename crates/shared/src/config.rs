//! Application configuration management.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Twitter API credentials.
    pub twitter: TwitterSettings,
    /// Tweet store configuration.
    pub store: StoreConfig,
    /// Per-provider storage settings, keyed by provider name.
    #[serde(default)]
    pub providers: BTreeMap<String, ProviderSettings>,
    /// Periodic store schedule.
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public base URL of the application, used by the task queue and cron.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Shared secret required on internal endpoints (store, enqueue, clear).
    #[serde(default)]
    pub internal_token: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            base_url: None,
            internal_token: None,
        }
    }
}

impl ServerConfig {
    /// Returns the configured base URL, or one derived from host and port.
    #[must_use]
    pub fn base_url(&self) -> String {
        if let Some(url) = &self.base_url {
            return url.trim_end_matches('/').to_string();
        }
        let host = match self.host.as_str() {
            "0.0.0.0" | "::" | "" => "localhost",
            other => other,
        };
        format!("http://{host}:{}", self.port)
    }
}

/// Twitter OAuth 1.0a credentials and endpoint settings.
#[derive(Debug, Clone, Deserialize)]
pub struct TwitterSettings {
    /// Consumer key (API key).
    #[serde(default)]
    pub consumer_key: String,
    /// Consumer secret (API secret).
    #[serde(default)]
    pub consumer_secret: String,
    /// Access token.
    #[serde(default)]
    pub access_token: String,
    /// Access token secret.
    #[serde(default)]
    pub access_token_secret: String,
    /// Numeric id of the account whose mentions are stored.
    #[serde(default)]
    pub user_id: String,
    /// Base URL of the Twitter API.
    #[serde(default = "default_twitter_api_url")]
    pub api_url: String,
    /// Request timeout in seconds.
    #[serde(default = "default_twitter_timeout")]
    pub timeout_secs: u64,
}

fn default_twitter_api_url() -> String {
    "https://api.twitter.com".to_string()
}

fn default_twitter_timeout() -> u64 {
    30
}

/// Tweet store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Container every provider stores tweets in.
    pub container: String,
    /// Comma-separated allow-list of provider names. All available providers when absent.
    #[serde(default)]
    pub blobstores: Option<String>,
}

impl StoreConfig {
    /// Returns the parsed allow-list, if one is configured.
    #[must_use]
    pub fn allowed_blobstores(&self) -> Option<Vec<String>> {
        self.blobstores.as_deref().map(|list| {
            list.split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(String::from)
                .collect()
        })
    }
}

/// Storage settings for one provider.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderSettings {
    /// Identity (access key id, account name).
    #[serde(default)]
    pub identity: Option<String>,
    /// Credential (secret key, account key).
    #[serde(default)]
    pub credential: Option<String>,
    /// Custom endpoint URL.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Region, where the provider has one.
    #[serde(default)]
    pub region: Option<String>,
    /// Root directory for filesystem providers.
    #[serde(default)]
    pub root: Option<PathBuf>,
}

impl ProviderSettings {
    /// Whether both identity and credential are present and non-empty.
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());
        present(&self.identity) && present(&self.credential)
    }
}

/// Periodic store schedule.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    /// Seconds between enqueue runs. Zero disables the schedule.
    #[serde(default = "default_interval")]
    pub interval_secs: u64,
}

fn default_interval() -> u64 {
    600 // 10 minutes
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("TWEETSTORE").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
