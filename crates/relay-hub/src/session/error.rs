//! Session error types
//!
//! Protocol misuse is not an error at this level; it is answered with a
//! structured response on the offending channel. The only errors a session
//! can surface are its two channels going away, both of which just end the
//! session loop.

use thiserror::Error;

/// Session error type
#[derive(Debug, Error)]
pub enum SessionError {
    /// The client channel's outbound queue is gone
    #[error("client channel closed")]
    ClientClosed,

    /// The shared backend channel is gone
    #[error("backend channel closed")]
    BackendClosed,
}

/// Session result type
pub type SessionResult<T> = Result<T, SessionError>;
