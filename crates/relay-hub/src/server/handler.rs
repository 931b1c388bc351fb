//! Client channel handler
//!
//! Drives one accepted client channel: a writer task drains the session's
//! outbound queue onto the socket, while the accept task's own loop decodes
//! inbound frames and feeds the session state machine. Cleanup always runs
//! here, whichever side disconnects first.

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio_util::bytes::Bytes;
use tokio_util::codec::Framed;

use relay_core::{Route, TransportReject};

use super::HubState;
use crate::session::Session;
use crate::transport::{client_codec, FrameError};

/// Handle one client connection until it disconnects.
pub async fn handle_client<R, T>(state: HubState<R>, io: T, peer_id: String)
where
    R: Route,
    T: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let max_frame_len = state.config().transport.max_frame_len;
    let client_buffer = state.config().transport.client_buffer;

    let framed = Framed::new(io, client_codec(max_frame_len));
    let (mut sink, mut frames) = framed.split();

    let (tx, mut rx) = mpsc::channel::<Value>(client_buffer);
    let mut session = Session::new(state, peer_id.clone(), tx);
    let session_id = session.handle().session_id().to_string();

    tracing::info!(session_id = %session_id, peer_id = %peer_id, "client connected");

    // Writer task: outbound queue -> socket
    let writer_session_id = session_id.clone();
    let writer = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            match serde_json::to_vec(&frame) {
                Ok(bytes) => {
                    if sink.send(Bytes::from(bytes)).await.is_err() {
                        tracing::debug!(
                            session_id = %writer_session_id,
                            "client connection closed while writing"
                        );
                        break;
                    }
                }
                Err(err) => {
                    tracing::warn!(
                        session_id = %writer_session_id,
                        error = %err,
                        "failed to encode outbound frame"
                    );
                }
            }
        }

        let _ = sink.close().await;
    });

    // Inbound loop: socket -> session state machine
    while let Some(next) = frames.next().await {
        match next {
            Ok(bytes) => match serde_json::from_slice::<Value>(&bytes) {
                Ok(frame) => {
                    if let Err(err) = session.handle_frame(frame).await {
                        tracing::debug!(
                            session_id = %session_id,
                            error = %err,
                            "session ended"
                        );
                        break;
                    }
                }
                Err(err) => {
                    tracing::debug!(
                        session_id = %session_id,
                        error = %err,
                        "undecodable client frame"
                    );
                    session
                        .reject_transport(TransportReject::undecodable(&err.to_string()))
                        .await;
                    break;
                }
            },
            Err(FrameError::Oversized(len)) => {
                tracing::warn!(
                    session_id = %session_id,
                    len,
                    "oversized client frame"
                );
                session
                    .reject_transport(TransportReject::oversized(len))
                    .await;
                break;
            }
            // Connection-level failure; nothing useful to reply with
            Err(FrameError::Io(err)) => {
                tracing::warn!(
                    session_id = %session_id,
                    error = %err,
                    "client connection error"
                );
                break;
            }
        }
    }

    // Unregister, then drop the outbound queue so the writer drains and exits
    session.close();
    drop(session);
    let _ = writer.await;

    tracing::info!(session_id = %session_id, peer_id = %peer_id, "client disconnected");
}
