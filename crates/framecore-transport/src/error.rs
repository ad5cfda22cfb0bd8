//! Transport-level errors.

use thiserror::Error;

/// Errors raised by an acceptor or connector while binding, accepting, or
/// connecting. Per-frame I/O errors on an already-open session surface as
/// [`crate::SessionHandler::on_error`] callbacks instead of here.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The bind or connect address could not be parsed or bound.
    #[error("transport configuration error: {0}")]
    Config(String),

    /// The underlying QUIC endpoint failed to accept or establish a
    /// connection.
    #[error("transport connection error: {0}")]
    Connection(String),

    /// A read or write on an open stream failed.
    #[error("transport io error: {0}")]
    Io(String),

    /// The peer sent a frame whose declared length exceeds what this
    /// adapter will allocate for.
    #[error("frame of {len} bytes exceeds the adapter's {max} byte limit")]
    FrameTooLarge {
        /// Declared frame length.
        len: u32,
        /// Configured limit.
        max: u32,
    },
}

/// Convenience alias for results returning [`TransportError`].
pub type Result<T> = std::result::Result<T, TransportError>;
