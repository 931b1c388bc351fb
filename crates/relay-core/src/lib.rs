//! # relay-core
//!
//! Wire-level domain types shared by the relay hub: routing keys,
//! backend envelopes, and the client-facing protocol frames.

pub mod envelope;
pub mod protocol;
pub mod route;

// Re-export commonly used types at crate root
pub use envelope::BackendEnvelope;
pub use protocol::{
    ClientCommand, CommandResponse, ProtocolViolation, ServerFrame, TransportReject,
};
pub use route::{HubRoute, PeerRoute, Route};
