//! Configuration for the review watcher service
//!
//! Layered loading: built-in defaults, then a YAML file, then environment
//! variables prefixed with `REVIEWSRV_` (nested fields separated by `__`,
//! e.g. `REVIEWSRV_SLACK__WEBHOOK_URL`). The config file path itself comes
//! from `REVIEWSRV_CONFIG` and defaults to `config/reviewsrv.yaml`.

use std::path::Path;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ReviewSrvError};
use crate::review::{StoreKind, TrackedApp};

/// Environment variable naming the config file path
pub const CONFIG_PATH_ENV: &str = "REVIEWSRV_CONFIG";

/// Default config file path
pub const DEFAULT_CONFIG_PATH: &str = "config/reviewsrv.yaml";

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Timeout applied to outbound HTTP requests, in seconds
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,
}

/// Seen-record storage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    #[serde(default = "default_redis_url")]
    pub url: String,

    /// Namespace prepended to every storage key
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

/// Slack delivery settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlackConfig {
    /// Incoming-webhook URL messages are posted to
    #[serde(default)]
    pub webhook_url: String,
}

/// One App Store app to watch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppStoreApp {
    /// Numeric App Store identifier
    pub app_id: String,

    /// Optional display name for notifications
    pub name: Option<String>,

    /// Country storefronts to poll
    #[serde(default = "default_countries")]
    pub countries: Vec<String>,
}

/// One Google Play app to watch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GooglePlayApp {
    /// Package name, e.g. `com.example.app`
    pub app_id: String,

    /// Optional display name for notifications
    pub name: Option<String>,

    /// Languages to poll
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,
}

/// Apps to watch, grouped by store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppsConfig {
    #[serde(default)]
    pub app_store: Vec<AppStoreApp>,

    #[serde(default)]
    pub google_play: Vec<GooglePlayApp>,
}

/// Complete service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,

    #[serde(default)]
    pub redis: RedisConfig,

    #[serde(default)]
    pub slack: SlackConfig,

    #[serde(default)]
    pub apps: AppsConfig,
}

// Default value functions
fn default_service_name() -> String {
    "reviewsrv".to_string()
}
fn default_http_timeout() -> u64 {
    15
}
fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}
fn default_key_prefix() -> String {
    "reviews".to_string()
}
fn default_countries() -> Vec<String> {
    vec!["us".to_string()]
}
fn default_languages() -> Vec<String> {
    vec!["en".to_string()]
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            http_timeout_secs: default_http_timeout(),
        }
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
            key_prefix: default_key_prefix(),
        }
    }
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            webhook_url: String::new(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceConfig::default(),
            redis: RedisConfig::default(),
            slack: SlackConfig::default(),
            apps: AppsConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default path, env-overridable
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV)
            .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(path)
    }

    /// Load configuration from a specific YAML file
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed("REVIEWSRV_").split("__"))
            .extract()?;

        Ok(config)
    }

    /// Timeout applied to outbound HTTP requests
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.service.http_timeout_secs)
    }

    /// Flatten the per-store app lists into the watch list
    pub fn tracked_apps(&self) -> Vec<TrackedApp> {
        let mut apps = Vec::new();

        for app in &self.apps.app_store {
            apps.push(TrackedApp {
                store: StoreKind::AppStore,
                app_id: app.app_id.clone(),
                name: app.name.clone(),
                locales: app.countries.clone(),
            });
        }

        for app in &self.apps.google_play {
            apps.push(TrackedApp {
                store: StoreKind::GooglePlay,
                app_id: app.app_id.clone(),
                name: app.name.clone(),
                locales: app.languages.clone(),
            });
        }

        apps
    }

    /// Validate configuration completeness
    pub fn validate(&self) -> Result<()> {
        if self.service.name.is_empty() {
            return Err(ReviewSrvError::config("Service name cannot be empty"));
        }

        if self.service.http_timeout_secs == 0 {
            return Err(ReviewSrvError::config("HTTP timeout must be positive"));
        }

        if self.redis.url.is_empty() {
            return Err(ReviewSrvError::config("Redis URL cannot be empty"));
        }

        if self.redis.key_prefix.is_empty() {
            return Err(ReviewSrvError::config("Key prefix cannot be empty"));
        }

        if self.slack.webhook_url.is_empty() {
            return Err(ReviewSrvError::config("Slack webhook URL cannot be empty"));
        }

        for app in &self.apps.app_store {
            if app.app_id.is_empty() {
                return Err(ReviewSrvError::config("App Store app id cannot be empty"));
            }
            if app.countries.is_empty() {
                return Err(ReviewSrvError::config(format!(
                    "At least one country must be configured for App Store app '{}'",
                    app.app_id
                )));
            }
        }

        for app in &self.apps.google_play {
            if app.app_id.is_empty() {
                return Err(ReviewSrvError::config("Google Play app id cannot be empty"));
            }
            if app.languages.is_empty() {
                return Err(ReviewSrvError::config(format!(
                    "At least one language must be configured for Google Play app '{}'",
                    app.app_id
                )));
            }
        }

        Ok(())
    }
}
