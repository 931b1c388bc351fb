//! Session state machine
//!
//! One [`Session`] per client channel. Two-level routes bind through an
//! explicit connect message and then relay `message` frames; single-level
//! routes are bound at accept time from the peer identity and every frame
//! is forwarded verbatim. Misuse of the protocol is answered with a
//! structured failure response and never changes session state.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::mpsc;

use relay_core::{
    BackendEnvelope, ClientCommand, ProtocolViolation, Route, ServerFrame, TransportReject,
};

use super::{ClientHandle, SessionError, SessionResult};
use crate::server::HubState;

/// Session lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Channel accepted, no routing key assigned yet
    Unbound,
    /// Routing key assigned and registered
    Bound,
    /// Channel disconnected (terminal)
    Closed,
}

/// State machine for one client channel
pub struct Session<R: Route> {
    hub: HubState<R>,
    handle: Arc<ClientHandle>,
    state: SessionState,
    route: Option<R>,
    /// True when the route shape binds implicitly from the peer identity;
    /// such sessions skip the connect/message protocol entirely.
    passthrough: bool,
}

impl<R: Route> Session<R> {
    /// Create a session for a freshly accepted client channel.
    ///
    /// `sender` is the outbound frame queue drained by the channel's writer.
    /// Implicitly addressed route shapes are bound and registered here.
    pub fn new(hub: HubState<R>, peer_id: impl Into<String>, sender: mpsc::Sender<Value>) -> Self {
        let handle = ClientHandle::new(peer_id, sender);
        let mut session = Self {
            hub,
            handle,
            state: SessionState::Unbound,
            route: None,
            passthrough: false,
        };

        if let Some(route) = R::implicit(session.handle.peer_id()) {
            session.passthrough = true;
            session.bind(route);
        }

        session
    }

    /// Get the session's channel handle
    pub fn handle(&self) -> &Arc<ClientHandle> {
        &self.handle
    }

    /// Get the current lifecycle state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Get the assigned routing key, if bound
    pub fn route(&self) -> Option<&R> {
        self.route.as_ref()
    }

    /// Handle one inbound client frame.
    ///
    /// Errors only when one of the session's channels is gone; protocol
    /// misuse is answered on the client channel and returns `Ok`.
    pub async fn handle_frame(&mut self, frame: Value) -> SessionResult<()> {
        if self.passthrough {
            return self.forward(frame).await;
        }

        match ClientCommand::decode(&frame) {
            ClientCommand::Connect { host_id } => self.handle_connect(host_id).await,
            ClientCommand::Relay { message } => self.handle_relay(message).await,
            ClientCommand::Unsupported(tag) => {
                self.reject(ProtocolViolation::UnsupportedType(tag)).await
            }
        }
    }

    /// Handle a connect message: assign and register the routing key.
    async fn handle_connect(&mut self, host_id: Option<String>) -> SessionResult<()> {
        let Some(host_id) = host_id.filter(|h| !h.is_empty()) else {
            return self.reject(ProtocolViolation::MissingHostId).await;
        };

        if self.state == SessionState::Bound {
            // A routing key is immutable once assigned
            return self.reject(ProtocolViolation::AlreadyBound).await;
        }

        let route = R::bound(self.handle.peer_id(), &host_id);

        if self.hub.config().session.reject_duplicate_connect {
            if let Some(existing) = self.hub.registry().lookup(&route) {
                if !existing.is_closed() {
                    tracing::warn!(
                        route = ?route,
                        session_id = %self.handle.session_id(),
                        "connect rejected, route already in use"
                    );
                    return self.reject(ProtocolViolation::RouteInUse).await;
                }
            }
        }

        self.bind(route);
        Ok(())
    }

    /// Handle a message frame: forward the payload to the backend channel.
    ///
    /// Fire-and-forget; no response is sent on success.
    async fn handle_relay(&mut self, message: Option<Value>) -> SessionResult<()> {
        if self.state != SessionState::Bound {
            return self.reject(ProtocolViolation::NotConnected).await;
        }

        let Some(message) = message else {
            return self.reject(ProtocolViolation::MissingMessage).await;
        };

        // Bound implies a route is assigned
        let Some(route) = self.route.clone() else {
            return self.reject(ProtocolViolation::NotConnected).await;
        };

        tracing::trace!(
            route = ?route,
            session_id = %self.handle.session_id(),
            "forwarding client message to backend"
        );

        self.hub
            .send_backend(BackendEnvelope::new(route, message))
            .await
    }

    /// Forward a raw frame for an implicitly addressed session.
    async fn forward(&mut self, message: Value) -> SessionResult<()> {
        let Some(route) = self.route.clone() else {
            return Ok(());
        };

        self.hub
            .send_backend(BackendEnvelope::new(route, message))
            .await
    }

    fn bind(&mut self, route: R) {
        self.hub
            .registry()
            .register(&route, Arc::clone(&self.handle));

        tracing::info!(
            route = ?route,
            session_id = %self.handle.session_id(),
            peer_id = %self.handle.peer_id(),
            "session bound"
        );

        self.route = Some(route);
        self.state = SessionState::Bound;
    }

    /// Send a structured failure response to the client
    async fn reject(&self, violation: ProtocolViolation) -> SessionResult<()> {
        tracing::debug!(
            session_id = %self.handle.session_id(),
            reason = %violation,
            "rejecting client frame"
        );

        self.handle
            .send(ServerFrame::rejected(&violation).to_value())
            .await
            .map_err(|_| SessionError::ClientClosed)
    }

    /// Send a transport-level error reply before the channel is closed
    pub async fn reject_transport(&self, reject: TransportReject) {
        let _ = self.handle.send(reject.to_value()).await;
    }

    /// Close the session: release the registry entry if one was ever bound.
    ///
    /// Idempotent; closing an unbound or already-closed session has no
    /// registry effect.
    pub fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        self.state = SessionState::Closed;

        if let Some(route) = self.route.take() {
            self.hub.registry().release(&route, self.handle.session_id());
        }

        tracing::info!(
            session_id = %self.handle.session_id(),
            peer_id = %self.handle.peer_id(),
            "session closed"
        );
    }
}

impl<R: Route> Drop for Session<R> {
    fn drop(&mut self) {
        self.close();
    }
}
