//! Configuration loading and management
//!
//! Every section has defaults, so an empty file (or no file at all) gives a
//! working local setup: file log under `public/orders.txt`, direct Telegram
//! notifications, server on port 8080.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::error::{ConfigError, StoreResult};
use crate::intake::ResetPolicy;
use crate::notify::{DEFAULT_API_BASE, PLACEHOLDER_BOT_TOKEN, PLACEHOLDER_CHAT_ID, TelegramCredentials};

pub const ENV_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
pub const ENV_CHAT_ID: &str = "TELEGRAM_CHAT_ID";
pub const ENV_BIND: &str = "BLOUZA_BIND";
pub const ENV_ORDERS_PATH: &str = "BLOUZA_ORDERS_PATH";

/// Older deployments export the credentials with this prefix
const LEGACY_ENV_PREFIX: &str = "VITE_";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Where the order log lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogBackend {
    /// A local text file, appended in place
    #[default]
    File,
    /// Another storefront server, through its relay routes
    Relay,
    /// Process memory; lost on restart
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrdersConfig {
    pub backend: LogBackend,
    pub path: PathBuf,
    /// Base URL of the server holding the log when `backend = relay`
    pub relay_url: String,
}

impl Default for OrdersConfig {
    fn default() -> Self {
        Self {
            backend: LogBackend::File,
            path: PathBuf::from("public/orders.txt"),
            relay_url: "http://localhost:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifierBackend {
    /// Post to `/api/telegram` on a storefront server
    Relay,
    /// Call the Bot API from this process
    #[default]
    Direct,
    /// No notifications; only the log counts
    Disabled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifierConfig {
    pub backend: NotifierBackend,
    pub relay_url: String,
    pub api_base: String,
    pub bot_token: String,
    pub chat_id: String,
    /// Offset of the dates printed in messages, in minutes east of UTC
    pub utc_offset_minutes: i32,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            backend: NotifierBackend::Direct,
            relay_url: "http://localhost:8080".to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            bot_token: PLACEHOLDER_BOT_TOKEN.to_string(),
            chat_id: PLACEHOLDER_CHAT_ID.to_string(),
            utc_offset_minutes: 60,
        }
    }
}

impl NotifierConfig {
    pub fn credentials(&self) -> TelegramCredentials {
        TelegramCredentials::new(&self.bot_token, &self.chat_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IntakeConfig {
    pub reset_delay_ms: u64,
    pub reset_policy: ResetPolicy,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            reset_delay_ms: 3000,
            reset_policy: ResetPolicy::Always,
        }
    }
}

impl IntakeConfig {
    pub fn reset_delay(&self) -> Duration {
        Duration::from_millis(self.reset_delay_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    pub refresh_interval_secs: u64,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: 30,
        }
    }
}

impl ReaderConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventsConfig {
    pub capacity: usize,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self { capacity: 1024 }
    }
}

/// Complete storefront configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorefrontConfig {
    pub server: ServerConfig,
    pub orders: OrdersConfig,
    pub notifier: NotifierConfig,
    pub intake: IntakeConfig,
    pub reader: ReaderConfig,
    pub events: EventsConfig,
}

impl StorefrontConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            message: format!("{}: {}", path.display(), e),
        })?;

        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            file: Some(path.display().to_string()),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> StoreResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from the process environment
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let lookup_credential = |key: &str| {
            lookup(key)
                .or_else(|| lookup(&format!("{LEGACY_ENV_PREFIX}{key}")))
                .filter(|v| !v.trim().is_empty())
        };

        if let Some(token) = lookup_credential(ENV_BOT_TOKEN) {
            self.notifier.bot_token = token;
        }
        if let Some(chat_id) = lookup_credential(ENV_CHAT_ID) {
            self.notifier.chat_id = chat_id;
        }
        if let Some(bind) = lookup(ENV_BIND).filter(|v| !v.trim().is_empty()) {
            self.server.bind = bind;
        }
        if let Some(path) = lookup(ENV_ORDERS_PATH).filter(|v| !v.trim().is_empty()) {
            self.orders.path = PathBuf::from(path);
        }
        self
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server
            .bind
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::InvalidValue {
                field: "server.bind".to_string(),
                value: self.server.bind.clone(),
                message: e.to_string(),
            })
    }

    /// Check values serde cannot check
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bind_addr()?;

        if self.events.capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "events.capacity".to_string(),
                value: "0".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        if self.reader.refresh_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "reader.refresh_interval_secs".to_string(),
                value: "0".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        if self.notifier.utc_offset_minutes.abs() >= 24 * 60 {
            return Err(ConfigError::InvalidValue {
                field: "notifier.utc_offset_minutes".to_string(),
                value: self.notifier.utc_offset_minutes.to_string(),
                message: "must be within one day".to_string(),
            });
        }

        Ok(())
    }
}
