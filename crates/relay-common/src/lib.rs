//! # relay-common
//!
//! Shared utilities for the relay hub: configuration, error handling, and
//! telemetry.

pub mod config;
pub mod error;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use config::{
    Addressing, AppSettings, ConfigError, Environment, RelayConfig, ServerConfig, SessionConfig,
    TransportConfig,
};
pub use error::{AppError, AppResult};
pub use telemetry::{try_init_tracing, try_init_tracing_with_config, TracingConfig, TracingError};
