//! Length-prefixed frame codecs
//!
//! Client channels carry a 4-byte big-endian length prefix per JSON frame.
//! The backend channel uses native byte order, matching Chrome's native
//! messaging framing. Both enforce the configured maximum frame length.

use std::io;

use thiserror::Error;
use tokio_util::bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder, LengthDelimitedCodec};

/// Client framing failures
///
/// Oversized frames are distinguished from connection-level errors: the
/// former get an error reply carrying the offending length, the latter just
/// close the channel.
#[derive(Debug, Error)]
pub enum FrameError {
    /// Frame length prefix exceeds the configured maximum
    #[error("frame length {0} exceeds maximum")]
    Oversized(usize),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Codec for client channels (4-byte big-endian length prefix).
///
/// The declared length is checked before any of the body is buffered, so an
/// oversized frame is rejected with its actual declared length and never
/// costs an allocation.
#[derive(Debug, Clone)]
pub struct ClientCodec {
    max_frame_len: usize,
}

impl ClientCodec {
    #[must_use]
    pub fn new(max_frame_len: usize) -> Self {
        Self { max_frame_len }
    }
}

impl Decoder for ClientCodec {
    type Item = BytesMut;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<BytesMut>, FrameError> {
        if src.len() < 4 {
            return Ok(None);
        }

        let declared = u32::from_be_bytes([src[0], src[1], src[2], src[3]]) as usize;
        if declared > self.max_frame_len {
            return Err(FrameError::Oversized(declared));
        }

        if src.len() < 4 + declared {
            src.reserve(4 + declared - src.len());
            return Ok(None);
        }

        src.advance(4);
        Ok(Some(src.split_to(declared)))
    }
}

impl Encoder<Bytes> for ClientCodec {
    type Error = FrameError;

    fn encode(&mut self, data: Bytes, dst: &mut BytesMut) -> Result<(), FrameError> {
        let len = data.len();
        if len > self.max_frame_len {
            return Err(FrameError::Oversized(len));
        }

        let prefix = u32::try_from(len).map_err(|_| FrameError::Oversized(len))?;
        dst.reserve(4 + len);
        dst.put_u32(prefix);
        dst.extend_from_slice(&data);
        Ok(())
    }
}

/// Codec for client channels
#[must_use]
pub fn client_codec(max_frame_len: usize) -> ClientCodec {
    ClientCodec::new(max_frame_len)
}

/// Codec for the backend channel (4-byte native-endian length prefix)
#[must_use]
pub fn backend_codec(max_frame_len: usize) -> LengthDelimitedCodec {
    LengthDelimitedCodec::builder()
        .length_field_length(4)
        .native_endian()
        .max_frame_length(max_frame_len)
        .new_codec()
}
