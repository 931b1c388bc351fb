//! Hub server
//!
//! Wires the pieces together: binds the listener, connects the backend
//! channel, and runs the dispatcher alongside the accept loop. The hub
//! shuts down when the backend closes its end of the channel.

mod handler;
mod state;

pub use handler::handle_client;
pub use state::HubState;

use std::sync::Arc;

use tokio::net::TcpListener;

use relay_common::{Addressing, AppError, AppResult, RelayConfig};
use relay_core::{HubRoute, PeerRoute, Route};

use crate::dispatch::BackendDispatcher;
use crate::routing::Registry;
use crate::transport::connect_stdio;

/// Run the hub with the configured addressing scheme until the backend
/// channel closes.
pub async fn run(config: RelayConfig) -> AppResult<()> {
    match config.hub.addressing {
        Addressing::TwoLevel => serve::<HubRoute>(config).await,
        Addressing::SingleLevel => serve::<PeerRoute>(config).await,
    }
}

async fn serve<R: Route>(config: RelayConfig) -> AppResult<()> {
    let config = Arc::new(config);
    let registry = Registry::<R>::new_shared();

    let (backend_tx, backend_rx) = connect_stdio::<R>(&config.transport);
    let state = HubState::new(Arc::clone(&registry), backend_tx, Arc::clone(&config));
    let dispatcher = BackendDispatcher::new(registry);

    let addr = config.hub.address();
    let listener = TcpListener::bind(&addr).await.map_err(AppError::Io)?;
    tracing::info!(addr = %addr, "hub listening");

    let accept_state = state.clone();
    let accept = async move {
        loop {
            match listener.accept().await {
                Ok((socket, peer)) => {
                    tracing::debug!(peer = %peer, "accepted client connection");
                    let state = accept_state.clone();
                    tokio::spawn(async move {
                        handle_client(state, socket, peer.to_string()).await;
                    });
                }
                Err(err) => {
                    tracing::warn!(error = %err, "failed to accept client connection");
                }
            }
        }
    };

    // The dispatcher ends when the backend closes its end; that is the
    // shutdown signal for the whole hub.
    tokio::select! {
        () = dispatcher.run(backend_rx) => {
            tracing::info!("backend channel closed, shutting down");
        }
        () = accept => {}
    }

    Ok(())
}
