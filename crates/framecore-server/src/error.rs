//! Server error types.

use thiserror::Error;

/// Errors that can occur while configuring or running the server.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Invalid bind address, missing configuration, or a bad key/cert path.
    #[error("configuration error: {0}")]
    Config(String),

    /// The framer rejected its configuration (e.g. encryption enabled
    /// without a key).
    #[error("framer configuration error: {0}")]
    Framer(#[from] framecore::FramerError),

    /// The transport adapter failed to bind or accept.
    #[error("transport error: {0}")]
    Transport(#[from] framecore_transport::TransportError),
}
