//! Backend envelopes
//!
//! Every message crossing the shared backend channel carries its routing
//! key alongside the payload, in both directions. The key fields are
//! flattened into the envelope so the wire shape is
//! `{extensionId, hostId, message}` for two-level keys and
//! `{extensionId, message}` for single-level keys.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::route::Route;

/// A routed message on the backend channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendEnvelope<R> {
    #[serde(flatten)]
    pub route: R,
    pub message: Value,
}

impl<R: Route> BackendEnvelope<R> {
    #[must_use]
    pub fn new(route: R, message: Value) -> Self {
        Self { route, message }
    }
}
