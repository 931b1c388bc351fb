//! Configuration loading

mod relay_config;

pub use relay_config::{
    Addressing, AppSettings, ConfigError, Environment, RelayConfig, ServerConfig, SessionConfig,
    TransportConfig,
};
