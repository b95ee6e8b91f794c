//! TOML configuration for a questboard deployment.
//!
//! Every section is optional. An empty document yields an in-memory store,
//! no notification routes, `questboard=info` logging, and English labels.

use crate::quest::domain::Recipient;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default tracing directive.
pub const DEFAULT_LOG_FILTER: &str = "questboard=info";

const DEFAULT_MAX_CONNECTIONS: u32 = 8;

/// Top-level configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildConfig {
    /// Entity store settings.
    #[serde(default)]
    pub store: StoreConfig,
    /// Notification gateway routes.
    #[serde(default)]
    pub notifications: NotificationConfig,
    /// Tracing settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Presentation settings.
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Entity store settings, consumed by
/// [`ConfiguredStore::from_config`](crate::quest::adapters::ConfiguredStore::from_config).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// PostgreSQL connection URL. The in-memory store is used when absent.
    #[serde(default)]
    pub database_url: Option<String>,
    /// Upper bound for pooled connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            max_connections: default_max_connections(),
        }
    }
}

/// Notification routing: which bot account delivers on each platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Platform name to delivering account identifier.
    #[serde(default)]
    pub platform_accounts: BTreeMap<String, String>,
}

impl NotificationConfig {
    /// Builds the delivery address for a recipient.
    ///
    /// Returns `None` when no account is configured for the recipient's
    /// platform.
    #[must_use]
    pub fn address_for(&self, recipient: &impl Recipient) -> Option<String> {
        let contact = recipient.contact();
        self.platform_accounts
            .get(contact.platform())
            .map(|account| format!("{account}:FriendMessage:{}", contact.handle()))
    }
}

/// Tracing settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, for example `questboard=debug`.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

/// Presentation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Locale used for status labels (`en` or `zh`).
    #[serde(default = "default_locale")]
    pub locale: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            locale: default_locale(),
        }
    }
}

const fn default_max_connections() -> u32 {
    DEFAULT_MAX_CONNECTIONS
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

fn default_locale() -> String {
    "en".to_owned()
}

/// Errors returned while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The document is not valid configuration TOML.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

impl GuildConfig {
    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed documents.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Reads and parses a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] when the file cannot be read and
    /// [`ConfigError::Parse`] when it is malformed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config_path = path.as_ref();
        let text = std::fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
            path: config_path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}
