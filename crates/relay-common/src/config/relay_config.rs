//! Relay hub configuration structs
//!
//! Loads configuration from environment variables, with defaults matching
//! the hub's historical fixed values (listen on 127.0.0.1:31888, 64 KiB
//! frame limit).

use serde::Deserialize;
use std::env;

/// Main relay configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RelayConfig {
    pub app: AppSettings,
    pub hub: ServerConfig,
    pub transport: TransportConfig,
    pub session: SessionConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub env: Environment,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            env: Environment::default(),
        }
    }
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

/// Routing key granularity the hub runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Addressing {
    /// Sessions bind through an explicit connect naming a host id.
    #[default]
    TwoLevel,
    /// Sessions are addressed by their peer identity alone.
    SingleLevel,
}

/// Client listener configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub addressing: Addressing,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            addressing: Addressing::default(),
        }
    }
}

/// Framing and channel-buffer configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TransportConfig {
    /// Maximum length-prefixed frame size, in bytes.
    #[serde(default = "default_max_frame_len")]
    pub max_frame_len: usize,
    /// Outbound queue depth per client channel.
    #[serde(default = "default_client_buffer")]
    pub client_buffer: usize,
    /// Queue depth of the shared backend channel.
    #[serde(default = "default_backend_buffer")]
    pub backend_buffer: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            max_frame_len: default_max_frame_len(),
            client_buffer: default_client_buffer(),
            backend_buffer: default_backend_buffer(),
        }
    }
}

/// Session policy configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionConfig {
    /// Reject a connect whose routing key collides with a still-live
    /// session, instead of silently overwriting its registry entry.
    #[serde(default)]
    pub reject_duplicate_connect: bool,
}

// Default value functions
fn default_app_name() -> String {
    "relay-hub".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    31888
}

fn default_max_frame_len() -> usize {
    64 * 1024
}

fn default_client_buffer() -> usize {
    100
}

fn default_backend_buffer() -> usize {
    1024
}

impl RelayConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if a variable is present but unparseable
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Ok(Self {
            app: AppSettings {
                name: env::var("APP_NAME").unwrap_or_else(|_| default_app_name()),
                env: env::var("APP_ENV")
                    .ok()
                    .and_then(|s| match s.to_lowercase().as_str() {
                        "production" => Some(Environment::Production),
                        "staging" => Some(Environment::Staging),
                        "development" => Some(Environment::Development),
                        _ => None,
                    })
                    .unwrap_or_default(),
            },
            hub: ServerConfig {
                host: env::var("HUB_HOST").unwrap_or_else(|_| default_host()),
                port: parse_var("HUB_PORT")?.unwrap_or_else(default_port),
                addressing: env::var("HUB_ADDRESSING")
                    .ok()
                    .map(|s| match s.to_lowercase().as_str() {
                        "two-level" => Ok(Addressing::TwoLevel),
                        "single-level" => Ok(Addressing::SingleLevel),
                        _ => Err(ConfigError::InvalidValue("HUB_ADDRESSING", s.clone())),
                    })
                    .transpose()?
                    .unwrap_or_default(),
            },
            transport: TransportConfig {
                max_frame_len: parse_var("HUB_MAX_FRAME_LEN")?.unwrap_or_else(default_max_frame_len),
                client_buffer: parse_var("HUB_CLIENT_BUFFER")?.unwrap_or_else(default_client_buffer),
                backend_buffer: parse_var("HUB_BACKEND_BUFFER")?
                    .unwrap_or_else(default_backend_buffer),
            },
            session: SessionConfig {
                reject_duplicate_connect: parse_var("HUB_REJECT_DUPLICATE_CONNECT")?
                    .unwrap_or(false),
            },
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue(name, raw)),
        Err(_) => Ok(None),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
