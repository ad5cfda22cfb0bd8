//! Errors from session send/receive operations.

use thiserror::Error;

/// Errors surfaced by [`crate::session::Session`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The session's cancellation context fired while a send was enqueuing,
    /// or a send was attempted after `close()`.
    #[error("connection closed")]
    ConnectionClosed,

    /// The underlying framer rejected the encode call.
    #[error("encode failed: {0}")]
    EncodeFailed(#[from] framecore::FramerError),
}

/// Convenience alias for results returning [`SessionError`].
pub type Result<T> = std::result::Result<T, SessionError>;
