//! Client sessions
//!
//! Per-client state machine driving the connect/message protocol and the
//! registry bookkeeping for one client channel.

mod error;
mod handle;
mod session;

pub use error::{SessionError, SessionResult};
pub use handle::ClientHandle;
pub use session::{Session, SessionState};
