//! Backend channel plumbing
//!
//! Bridges the process's single backend connection onto a pair of in-memory
//! queues: sessions push outbound envelopes into the shared sender, the
//! dispatcher drains decoded inbound envelopes from the receiver. The
//! production backend is the process's own stdin/stdout (native messaging);
//! tests substitute any `AsyncRead`/`AsyncWrite` pair.

use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio_util::bytes::Bytes;
use tokio_util::codec::{FramedRead, FramedWrite};

use relay_common::TransportConfig;
use relay_core::{BackendEnvelope, Route};

use super::framing::backend_codec;

/// Spawn reader and writer tasks for the backend connection.
///
/// Returns the shared outbound sender (cloned into every session) and the
/// inbound receiver consumed by the dispatcher. The receiver yields `None`
/// once the backend closes its end, which is the hub's shutdown signal.
pub fn spawn_backend<R, Rd, Wr>(
    reader: Rd,
    writer: Wr,
    transport: &TransportConfig,
) -> (
    mpsc::Sender<BackendEnvelope<R>>,
    mpsc::Receiver<BackendEnvelope<R>>,
)
where
    R: Route,
    Rd: AsyncRead + Unpin + Send + 'static,
    Wr: AsyncWrite + Unpin + Send + 'static,
{
    let max_frame_len = transport.max_frame_len;
    let (out_tx, mut out_rx) = mpsc::channel::<BackendEnvelope<R>>(transport.backend_buffer);
    let (in_tx, in_rx) = mpsc::channel::<BackendEnvelope<R>>(transport.backend_buffer);

    // Writer: drain the shared outbound queue onto the backend connection
    tokio::spawn(async move {
        let mut sink = FramedWrite::new(writer, backend_codec(max_frame_len));

        while let Some(envelope) = out_rx.recv().await {
            let bytes = match serde_json::to_vec(&envelope) {
                Ok(bytes) => bytes,
                Err(err) => {
                    tracing::warn!(error = %err, "failed to encode backend envelope");
                    continue;
                }
            };

            if bytes.len() > max_frame_len {
                tracing::warn!(len = bytes.len(), "backend frame exceeds maximum length");
                continue;
            }

            if sink.send(Bytes::from(bytes)).await.is_err() {
                tracing::warn!("backend connection closed while writing");
                break;
            }
        }
    });

    // Reader: decode inbound envelopes until the backend closes its end
    tokio::spawn(async move {
        let mut frames = FramedRead::new(reader, backend_codec(max_frame_len));

        while let Some(next) = frames.next().await {
            match next {
                Ok(bytes) => match serde_json::from_slice::<BackendEnvelope<R>>(&bytes) {
                    Ok(envelope) => {
                        if in_tx.send(envelope).await.is_err() {
                            break;
                        }
                    }
                    Err(err) => {
                        // Skip the frame; one bad message must not kill routing
                        tracing::error!(error = %err, "failed to parse backend frame");
                    }
                },
                Err(err) => {
                    tracing::error!(error = %err, "backend framing error");
                    break;
                }
            }
        }

        tracing::info!("backend channel closed");
    });

    (out_tx, in_rx)
}

/// Connect the backend channel to the process's stdin/stdout.
pub fn connect_stdio<R: Route>(
    transport: &TransportConfig,
) -> (
    mpsc::Sender<BackendEnvelope<R>>,
    mpsc::Receiver<BackendEnvelope<R>>,
) {
    spawn_backend(tokio::io::stdin(), tokio::io::stdout(), transport)
}
