//! Top-level application configuration.

use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use url::Url;

use super::{HttpRetryConfig, ServerConfig, deserialize_duration_from_seconds};

/// Provides the default value for poll_interval_secs.
fn default_poll_interval() -> Duration {
    Duration::from_secs(180)
}

/// Provides the default value for idle_poll_interval_secs.
fn default_idle_poll_interval() -> Duration {
    Duration::from_secs(60)
}

/// Provides the default value for error_backoff_secs.
fn default_error_backoff() -> Duration {
    Duration::from_secs(300)
}

/// Provides the default value for cooldown_secs.
fn default_cooldown() -> Duration {
    Duration::from_secs(1800)
}

/// Provides the default value for cooldown_expiry_secs.
fn default_cooldown_expiry() -> Duration {
    Duration::from_secs(3600)
}

/// Provides the default value for request_timeout_secs.
fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

/// Provides the default value for shutdown_timeout_secs.
fn default_shutdown_timeout() -> Duration {
    Duration::from_secs(30)
}

/// Provides the default flight feed endpoint.
fn default_source_url() -> Url {
    Url::parse("https://opensky-network.org/api/states/all")
        .expect("default source URL must parse")
}

/// Application configuration for Skywatch.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Database URL for the SQLite database.
    pub database_url: String,

    /// Endpoint of the flight-state feed.
    #[serde(default = "default_source_url")]
    pub source_url: Url,

    /// Webhook the notification sink delivers alerts to.
    pub webhook_url: Url,

    /// Scheduler cycle interval while at least one area is monitored.
    #[serde(
        rename = "poll_interval_secs",
        deserialize_with = "deserialize_duration_from_seconds",
        default = "default_poll_interval"
    )]
    pub poll_interval: Duration,

    /// Poll-for-work interval while no areas are monitored.
    #[serde(
        rename = "idle_poll_interval_secs",
        deserialize_with = "deserialize_duration_from_seconds",
        default = "default_idle_poll_interval"
    )]
    pub idle_poll_interval: Duration,

    /// Extended sleep after a failed scheduler cycle.
    #[serde(
        rename = "error_backoff_secs",
        deserialize_with = "deserialize_duration_from_seconds",
        default = "default_error_backoff"
    )]
    pub error_backoff: Duration,

    /// Minimum gap between repeat notifications for the same
    /// (subscriber, aircraft) pair.
    #[serde(
        rename = "cooldown_secs",
        deserialize_with = "deserialize_duration_from_seconds",
        default = "default_cooldown"
    )]
    pub cooldown: Duration,

    /// Age at which cooldown entries are purged.
    #[serde(
        rename = "cooldown_expiry_secs",
        deserialize_with = "deserialize_duration_from_seconds",
        default = "default_cooldown_expiry"
    )]
    pub cooldown_expiry: Duration,

    /// Per-request timeout toward the flight feed and the webhook.
    #[serde(
        rename = "request_timeout_secs",
        deserialize_with = "deserialize_duration_from_seconds",
        default = "default_request_timeout"
    )]
    pub request_timeout: Duration,

    /// The maximum time to wait for graceful shutdown.
    #[serde(
        rename = "shutdown_timeout_secs",
        deserialize_with = "deserialize_duration_from_seconds",
        default = "default_shutdown_timeout"
    )]
    pub shutdown_timeout: Duration,

    /// Re-populate the active monitor set from storage at boot. Off by
    /// default: a restart requires subscribers to re-issue start-monitoring,
    /// matching the stored-active-but-not-polled decoupling.
    #[serde(default)]
    pub resume_active_areas: bool,

    /// Configuration for HTTP client retry policies.
    #[serde(default)]
    pub http_retry: HttpRetryConfig,

    /// REST API server configuration.
    #[serde(default)]
    pub server: ServerConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            source_url: default_source_url(),
            webhook_url: Url::parse("http://127.0.0.1:9090/notify")
                .expect("default webhook URL must parse"),
            poll_interval: default_poll_interval(),
            idle_poll_interval: default_idle_poll_interval(),
            error_backoff: default_error_backoff(),
            cooldown: default_cooldown(),
            cooldown_expiry: default_cooldown_expiry(),
            request_timeout: default_request_timeout(),
            shutdown_timeout: default_shutdown_timeout(),
            resume_active_areas: false,
            http_retry: HttpRetryConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Creates a new `AppConfig` by reading `app.yaml` from the configuration
    /// directory, layered with `SKYWATCH__`-prefixed environment variables.
    pub fn new(config_dir: Option<&str>) -> Result<Self, ConfigError> {
        let config_dir_str = config_dir.unwrap_or("configs");
        let s = Config::builder()
            .add_source(File::with_name(&format!("{}/app.yaml", config_dir_str)))
            .add_source(Environment::with_prefix("SKYWATCH").separator("__"))
            .build()?;
        s.try_deserialize()
    }
}
