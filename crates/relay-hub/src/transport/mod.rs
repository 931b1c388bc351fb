//! Framed transports
//!
//! Length-prefixed JSON framing for client channels and the backend
//! channel. The hub core never touches sockets directly; it sees both ends
//! as queues of decoded frames.

mod backend;
mod framing;

pub use backend::{connect_stdio, spawn_backend};
pub use framing::{backend_codec, client_codec, ClientCodec, FrameError};
