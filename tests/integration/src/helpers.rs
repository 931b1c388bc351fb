//! Test helpers for integration tests
//!
//! Spawns a complete in-process hub: framed client channels served by the
//! real connection handler, the real dispatcher, and a simulated backend
//! peer on the other end of an in-memory pipe.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::io::{duplex, DuplexStream, ReadHalf, WriteHalf};
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tokio_util::bytes::Bytes;
use tokio_util::codec::{Framed, FramedRead, FramedWrite, LengthDelimitedCodec};

use relay_common::RelayConfig;
use relay_core::Route;
use relay_hub::dispatch::BackendDispatcher;
use relay_hub::routing::Registry;
use relay_hub::server::{handle_client, HubState};
use relay_hub::transport::{backend_codec, client_codec, spawn_backend, ClientCodec};

/// How long to wait for an expected frame
pub const RECV_TIMEOUT: Duration = Duration::from_secs(1);

/// How long to wait before declaring a channel silent
pub const SILENCE_TIMEOUT: Duration = Duration::from_millis(100);

/// In-process hub with a simulated backend peer
pub struct TestHub<R: Route> {
    state: HubState<R>,
    dispatcher: JoinHandle<()>,
    backend_sink: FramedWrite<WriteHalf<DuplexStream>, LengthDelimitedCodec>,
    backend_frames: FramedRead<ReadHalf<DuplexStream>, LengthDelimitedCodec>,
}

impl<R: Route> TestHub<R> {
    /// Start a hub with default configuration
    pub fn start() -> Self {
        Self::start_with_config(RelayConfig::default())
    }

    /// Start a hub with custom configuration
    pub fn start_with_config(config: RelayConfig) -> Self {
        let (hub_io, backend_io) = duplex(256 * 1024);
        let (hub_read, hub_write) = tokio::io::split(hub_io);
        let (backend_read, backend_write) = tokio::io::split(backend_io);

        let (backend_tx, backend_rx) = spawn_backend::<R, _, _>(hub_read, hub_write, &config.transport);

        let registry = Registry::<R>::new_shared();
        let state = HubState::new(Arc::clone(&registry), backend_tx, Arc::new(config.clone()));
        let dispatcher = tokio::spawn(BackendDispatcher::new(registry).run(backend_rx));

        Self {
            state,
            dispatcher,
            backend_sink: FramedWrite::new(
                backend_write,
                backend_codec(config.transport.max_frame_len),
            ),
            backend_frames: FramedRead::new(
                backend_read,
                backend_codec(config.transport.max_frame_len),
            ),
        }
    }

    /// Get the shared hub state
    pub fn state(&self) -> &HubState<R> {
        &self.state
    }

    /// Connect a new client channel served by the real handler
    pub fn client(&self, peer_id: &str) -> TestClient {
        let (client_io, server_io) = duplex(256 * 1024);
        let state = self.state.clone();
        let peer_id = peer_id.to_string();

        tokio::spawn(async move {
            handle_client(state, server_io, peer_id).await;
        });

        // Permissive client-side codec; the hub enforces its own limit
        TestClient {
            frames: Framed::new(client_io, client_codec(1024 * 1024)),
        }
    }

    /// Inject a frame from the backend peer
    pub async fn backend_send(&mut self, value: &Value) -> Result<()> {
        let bytes = serde_json::to_vec(value)?;
        self.backend_sink
            .send(Bytes::from(bytes))
            .await
            .context("backend pipe closed")
    }

    /// Receive the next frame the hub wrote to the backend peer
    pub async fn backend_recv(&mut self) -> Result<Value> {
        let frame = timeout(RECV_TIMEOUT, self.backend_frames.next())
            .await
            .context("timed out waiting for backend frame")?
            .context("backend pipe closed")??;
        Ok(serde_json::from_slice(&frame)?)
    }

    /// Assert the hub wrote nothing to the backend peer
    pub async fn backend_silent(&mut self) -> Result<()> {
        match timeout(SILENCE_TIMEOUT, self.backend_frames.next()).await {
            Err(_) => Ok(()),
            Ok(frame) => bail!("expected backend silence, got {frame:?}"),
        }
    }

    /// Close the backend pipe and return the dispatcher task handle.
    ///
    /// The hub treats backend EOF as its shutdown signal; awaiting the
    /// returned handle observes that.
    pub fn close_backend(self) -> JoinHandle<()> {
        self.dispatcher
    }
}

/// One framed client channel
pub struct TestClient {
    frames: Framed<DuplexStream, ClientCodec>,
}

impl TestClient {
    /// Send a JSON frame to the hub
    pub async fn send(&mut self, value: &Value) -> Result<()> {
        let bytes = serde_json::to_vec(value)?;
        self.send_raw(Bytes::from(bytes)).await
    }

    /// Send raw frame bytes to the hub
    pub async fn send_raw(&mut self, bytes: Bytes) -> Result<()> {
        self.frames.send(bytes).await.context("client pipe closed")
    }

    /// Receive the next JSON frame from the hub
    pub async fn recv(&mut self) -> Result<Value> {
        let frame = timeout(RECV_TIMEOUT, self.frames.next())
            .await
            .context("timed out waiting for client frame")?
            .context("client pipe closed")??;
        Ok(serde_json::from_slice(&frame)?)
    }

    /// Assert the hub sent nothing on this channel
    pub async fn expect_silence(&mut self) -> Result<()> {
        match timeout(SILENCE_TIMEOUT, self.frames.next()).await {
            Err(_) => Ok(()),
            Ok(frame) => bail!("expected silence, got {frame:?}"),
        }
    }
}

/// Poll until `predicate` holds or a deadline passes
pub async fn wait_for(predicate: impl Fn() -> bool) -> Result<()> {
    for _ in 0..100 {
        if predicate() {
            return Ok(());
        }
        sleep(Duration::from_millis(10)).await;
    }
    bail!("condition not reached within timeout")
}
