//! Reference server binary for the secure message framing core.
//!
//! Wires a [`framecore_transport::QuicAcceptor`] to a
//! [`framecore_session::SessionManager`] and a [`handler::LoggingHandler`],
//! giving a minimal but complete process: accept QUIC connections, frame
//! and authenticate traffic on each one, and track live sessions for
//! broadcast or shutdown.
//!
//! # Components
//!
//! - [`handler::LoggingHandler`]: the default [`framecore_transport::SessionHandler`]
//! - [`Server`]: binds a [`QuicAcceptor`] and runs its accept loop
//! - [`ServerRuntimeConfig`]: bind address, TLS material, and framer settings

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod error;
pub mod handler;

use std::{net::SocketAddr, sync::Arc};

pub use error::ServerError;
use framecore::FramerConfig;
pub use framecore_session::SessionManager;
use framecore_transport::{Acceptor, QuicAcceptor};
pub use handler::LoggingHandler;

/// Configuration for a [`Server`] instance.
#[derive(Debug, Clone)]
pub struct ServerRuntimeConfig {
    /// Address to bind to, e.g. `"0.0.0.0:4433"`.
    pub bind_address: String,
    /// Path to a PEM-encoded TLS certificate. With `key_path`, used for the
    /// QUIC endpoint; otherwise a self-signed certificate is generated.
    pub cert_path: Option<String>,
    /// Path to a PEM-encoded TLS private key.
    pub key_path: Option<String>,
    /// Framer configuration applied to every accepted session.
    pub framer: FramerConfig,
    /// Per-session bounded queue capacity.
    pub queue_capacity: usize,
}

impl Default for ServerRuntimeConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:4433".to_string(),
            cert_path: None,
            key_path: None,
            framer: FramerConfig::default(),
            queue_capacity: framecore_session::DEFAULT_QUEUE_CAPACITY,
        }
    }
}

/// Reference server process.
///
/// Owns a bound [`QuicAcceptor`] and the [`SessionManager`] it registers
/// sessions into. Dropping or stopping the acceptor leaves already-accepted
/// sessions running until they close on their own.
pub struct Server {
    acceptor: QuicAcceptor<LoggingHandler>,
    manager: Arc<SessionManager<framecore::SystemEnv>>,
}

impl Server {
    /// Binds the QUIC endpoint described by `config`.
    ///
    /// # Errors
    ///
    /// [`ServerError::Config`] if `config.queue_capacity` is zero (a bounded
    /// channel cannot have zero capacity); [`ServerError::Framer`] if
    /// `config.framer` is invalid (e.g. encryption enabled without a key);
    /// [`ServerError::Transport`] if the endpoint cannot be bound.
    pub fn bind(config: ServerRuntimeConfig) -> Result<Self, ServerError> {
        if config.queue_capacity == 0 {
            return Err(ServerError::Config("queue_capacity must be at least 1".to_string()));
        }

        let manager = Arc::new(SessionManager::new());
        let handler = Arc::new(LoggingHandler);

        let acceptor = QuicAcceptor::bind(
            &config.bind_address,
            config.cert_path.as_deref(),
            config.key_path.as_deref(),
            config.framer,
            manager.clone(),
            handler,
        )?
        .with_queue_capacity(config.queue_capacity);

        Ok(Self { acceptor, manager })
    }

    /// Runs the accept loop until the endpoint stops yielding connections.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!(addr = %self.acceptor.local_addr()?, "server starting");
        self.acceptor.start().await?;
        Ok(())
    }

    /// Local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.acceptor.local_addr()?)
    }

    /// The session manager backing this server, for broadcast or inspection
    /// from outside the accept loop.
    pub fn sessions(&self) -> &Arc<SessionManager<framecore::SystemEnv>> {
        &self.manager
    }
}
