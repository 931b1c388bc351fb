//! Hub state
//!
//! Shared dependencies handed to every session and to the dispatcher.

use std::sync::Arc;

use tokio::sync::mpsc;

use relay_common::RelayConfig;
use relay_core::{BackendEnvelope, Route};

use crate::routing::Registry;
use crate::session::{SessionError, SessionResult};

/// Shared hub state
///
/// Holds the single registry and the shared backend channel handle. Cloned
/// into every accepted client session.
pub struct HubState<R: Route> {
    registry: Arc<Registry<R>>,
    backend_tx: mpsc::Sender<BackendEnvelope<R>>,
    config: Arc<RelayConfig>,
}

impl<R: Route> HubState<R> {
    /// Create a new hub state
    pub fn new(
        registry: Arc<Registry<R>>,
        backend_tx: mpsc::Sender<BackendEnvelope<R>>,
        config: Arc<RelayConfig>,
    ) -> Self {
        Self {
            registry,
            backend_tx,
            config,
        }
    }

    /// Get the routing registry
    pub fn registry(&self) -> &Registry<R> {
        &self.registry
    }

    /// Get the configuration
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Forward an envelope onto the shared backend channel
    pub async fn send_backend(&self, envelope: BackendEnvelope<R>) -> SessionResult<()> {
        self.backend_tx
            .send(envelope)
            .await
            .map_err(|_| SessionError::BackendClosed)
    }
}

impl<R: Route> Clone for HubState<R> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            backend_tx: self.backend_tx.clone(),
            config: Arc::clone(&self.config),
        }
    }
}

impl<R: Route> std::fmt::Debug for HubState<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HubState")
            .field("registry", &self.registry)
            .finish()
    }
}
