//! Backend dispatcher
//!
//! Single long-lived listener on the backend channel. Each inbound envelope
//! is resolved through the registry and its payload forwarded to the owning
//! client channel. Delivery is best-effort: the backend has no reliable way
//! to know a client is gone until it tries, so unresolvable keys are
//! dropped, not errors.

use std::sync::Arc;

use tokio::sync::mpsc;

use relay_core::{BackendEnvelope, Route};

use crate::routing::Registry;

/// Demultiplexes backend messages to client channels
pub struct BackendDispatcher<R: Route> {
    registry: Arc<Registry<R>>,
}

impl<R: Route> BackendDispatcher<R> {
    /// Create a new dispatcher over the shared registry
    #[must_use]
    pub fn new(registry: Arc<Registry<R>>) -> Self {
        Self { registry }
    }

    /// Run until the backend channel closes.
    pub async fn run(self, mut inbound: mpsc::Receiver<BackendEnvelope<R>>) {
        while let Some(envelope) = inbound.recv().await {
            self.dispatch(envelope).await;
        }

        tracing::info!("backend dispatcher stopped");
    }

    /// Route one backend envelope to its client channel, if any.
    async fn dispatch(&self, envelope: BackendEnvelope<R>) {
        let BackendEnvelope { route, message } = envelope;

        match self.registry.lookup(&route) {
            Some(handle) => {
                tracing::trace!(
                    route = ?route,
                    session_id = %handle.session_id(),
                    "delivering backend message"
                );

                if handle.send(R::deliver(message)).await.is_err() {
                    tracing::debug!(route = ?route, "client channel closed, message dropped");
                }
            }
            None => {
                tracing::debug!(route = ?route, "no session for route, message dropped");
            }
        }
    }
}
