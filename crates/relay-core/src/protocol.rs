//! Client-facing protocol frames
//!
//! Clients speak a small typed protocol: a `connect` message binds the
//! session to a routing key, `message` frames are forwarded to the backend,
//! and anything else is rejected with a structured response. Frames are
//! decoded once at the boundary into [`ClientCommand`] and matched
//! exhaustively from there.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Closed command set a client frame can decode to.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientCommand {
    /// `{type: "connect", hostId}` — bind the session to a routing key.
    Connect { host_id: Option<String> },
    /// `{type: "message", message}` — forward a payload to the backend.
    Relay { message: Option<Value> },
    /// Any other `type` tag.
    Unsupported(String),
}

impl ClientCommand {
    /// Decode a raw client frame.
    ///
    /// Missing or malformed fields are preserved as `None`/`Unsupported`
    /// rather than rejected here; the session handler owns the failure
    /// responses so the wire reasons stay in one place.
    #[must_use]
    pub fn decode(frame: &Value) -> Self {
        let kind = frame.get("type").and_then(Value::as_str).unwrap_or_default();
        match kind {
            "connect" => Self::Connect {
                host_id: frame
                    .get("hostId")
                    .and_then(Value::as_str)
                    .map(str::to_owned),
            },
            "message" => Self::Relay {
                message: frame.get("message").filter(|m| !is_falsy(m)).cloned(),
            },
            other => Self::Unsupported(other.to_owned()),
        }
    }
}

/// A payload must be truthy to be relayed: `null`, `false`, `0`, and `""`
/// are all treated as absent, per the wire contract.
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Protocol violations a client can commit.
///
/// The display strings are the wire contract; existing clients match on
/// them verbatim, including the `messsage` typo.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolViolation {
    #[error("no hostId in connect request")]
    MissingHostId,

    #[error("use connect first")]
    NotConnected,

    #[error("no message field in messsage")]
    MissingMessage,

    #[error("unsupported type {0}")]
    UnsupportedType(String),

    /// A routing key is immutable once assigned to a session.
    #[error("already connected")]
    AlreadyBound,

    /// Only raised when duplicate-connect rejection is enabled.
    #[error("hostId already in use")]
    RouteInUse,
}

/// Payload of a failure response frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResponse {
    pub successful: bool,
    pub reason: String,
}

/// Frames the hub writes to a client channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerFrame {
    /// Structured failure response to a bad client frame.
    Response { response: CommandResponse },
    /// Backend-originated payload relayed to the client.
    Message { message: Value },
}

impl ServerFrame {
    #[must_use]
    pub fn rejected(violation: &ProtocolViolation) -> Self {
        Self::Response {
            response: CommandResponse {
                successful: false,
                reason: violation.to_string(),
            },
        }
    }

    #[must_use]
    pub fn message(message: Value) -> Self {
        Self::Message { message }
    }

    #[must_use]
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Transport-level error reply, sent before closing a channel whose frames
/// cannot be decoded at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportReject {
    pub code: u32,
    pub error: String,
}

impl TransportReject {
    /// Frame length field exceeded the configured maximum.
    #[must_use]
    pub fn oversized(len: usize) -> Self {
        Self {
            code: 1,
            error: format!("invalid message length: {len}"),
        }
    }

    /// Frame bytes were not valid UTF-8 / JSON.
    #[must_use]
    pub fn undecodable(detail: &str) -> Self {
        Self {
            code: 3,
            error: format!("failed to parse json message: {detail}"),
        }
    }

    #[must_use]
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}
