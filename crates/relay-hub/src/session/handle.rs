//! Client channel handle
//!
//! Send-side handle for one client channel. Owned by the session that
//! accepted the channel; the registry holds additional references which are
//! invalidated when the session closes.

use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Handle to one client channel
pub struct ClientHandle {
    /// Unique session ID
    session_id: String,

    /// External identifier of the remote party, supplied by the transport
    peer_id: String,

    /// Outbound frame queue drained by the channel's writer task
    sender: mpsc::Sender<Value>,
}

impl ClientHandle {
    /// Create a new handle with a fresh session ID
    pub fn new(peer_id: impl Into<String>, sender: mpsc::Sender<Value>) -> Arc<Self> {
        Arc::new(Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            peer_id: peer_id.into(),
            sender,
        })
    }

    /// Get the session ID
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Get the transport-supplied peer identifier
    pub fn peer_id(&self) -> &str {
        &self.peer_id
    }

    /// Queue a frame for the client channel
    pub async fn send(&self, frame: Value) -> Result<(), mpsc::error::SendError<Value>> {
        self.sender.send(frame).await
    }

    /// Check if the client channel is gone
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

impl std::fmt::Debug for ClientHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientHandle")
            .field("session_id", &self.session_id)
            .field("peer_id", &self.peer_id)
            .finish()
    }
}
