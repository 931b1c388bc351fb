//! # relay-hub
//!
//! Relays messages between many short-lived client connections and a single
//! long-lived backend channel. Each client binds a routing key; backend
//! replies carry the key and are demultiplexed back to the owning client.

pub mod dispatch;
pub mod routing;
pub mod server;
pub mod session;
pub mod transport;
