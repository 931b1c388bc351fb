//! Routing keys
//!
//! A routing key addresses one client session when a backend-originated
//! message has to be relayed back to it. Two key shapes exist: a two-level
//! key bound by an explicit connect (extension id + host id) and a
//! single-level key derived from the channel's own peer identity. Both are
//! instances of the same [`Route`] trait so the registry, dispatcher, and
//! router are written once.

use std::fmt;
use std::hash::Hash;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::protocol::ServerFrame;

/// Shape of a routing key.
///
/// The outer/inner split drives the registry layout: entries live in an
/// outer bucket keyed by [`Route::Outer`], and the bucket is pruned once its
/// last inner entry is removed. Single-level keys use `()` as the inner
/// component.
pub trait Route:
    Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Outer key component (first registry level).
    type Outer: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static;
    /// Inner key component (second registry level).
    type Inner: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static;

    fn outer(&self) -> Self::Outer;

    fn inner(&self) -> Self::Inner;

    /// Key for a session addressed by its transport-supplied peer identity
    /// alone. `Some` means sessions are bound at accept time and every
    /// client frame is forwarded verbatim; `None` means sessions must bind
    /// through an explicit connect message.
    fn implicit(peer_id: &str) -> Option<Self>;

    /// Key bound by an explicit connect from `peer_id` naming `host_id`.
    fn bound(peer_id: &str, host_id: &str) -> Self;

    /// Shape of a backend-originated payload as written to the client
    /// channel.
    fn deliver(message: Value) -> Value;
}

/// Two-level routing key: extension id (supplied by the transport) plus the
/// host id named in the client's connect message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HubRoute {
    #[serde(rename = "extensionId")]
    pub extension_id: String,
    #[serde(rename = "hostId")]
    pub host_id: String,
}

impl HubRoute {
    #[must_use]
    pub fn new(extension_id: impl Into<String>, host_id: impl Into<String>) -> Self {
        Self {
            extension_id: extension_id.into(),
            host_id: host_id.into(),
        }
    }
}

impl Route for HubRoute {
    type Outer = String;
    type Inner = String;

    fn outer(&self) -> String {
        self.extension_id.clone()
    }

    fn inner(&self) -> String {
        self.host_id.clone()
    }

    fn implicit(_peer_id: &str) -> Option<Self> {
        None
    }

    fn bound(peer_id: &str, host_id: &str) -> Self {
        Self::new(peer_id, host_id)
    }

    fn deliver(message: Value) -> Value {
        ServerFrame::message(message).to_value()
    }
}

impl fmt::Display for HubRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.extension_id, self.host_id)
    }
}

/// Single-level routing key: the channel's own peer identity. Sessions
/// using this shape skip the connect/message protocol entirely.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeerRoute {
    #[serde(rename = "extensionId")]
    pub extension_id: String,
}

impl PeerRoute {
    #[must_use]
    pub fn new(extension_id: impl Into<String>) -> Self {
        Self {
            extension_id: extension_id.into(),
        }
    }
}

impl Route for PeerRoute {
    type Outer = String;
    type Inner = ();

    fn outer(&self) -> String {
        self.extension_id.clone()
    }

    fn inner(&self) {}

    fn implicit(peer_id: &str) -> Option<Self> {
        Some(Self::new(peer_id))
    }

    fn bound(peer_id: &str, _host_id: &str) -> Self {
        Self::new(peer_id)
    }

    // The envelope is dropped on delivery; the client sees the raw message.
    fn deliver(message: Value) -> Value {
        message
    }
}

impl fmt::Display for PeerRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension_id)
    }
}
