//! QUIC reference adapter (acceptor + connector) built on Quinn.
//!
//! Provides encrypted, multiplexed transport over UDP with TLS 1.3. This is
//! the only module in the crate that touches OS sockets; everything above
//! it (framing, decode, dispatch) is transport-agnostic.

use std::{net::SocketAddr, sync::Arc};

use framecore::{Framer, FramerConfig, SystemEnv};
use framecore_session::{DEFAULT_QUEUE_CAPACITY, Session, SessionManager};
use quinn::{ClientConfig, Endpoint, ServerConfig};

use crate::{
    acceptor::Acceptor,
    connector::Connector,
    driver::{run_read_loop, run_write_loop},
    error::{Result, TransportError},
    handler::SessionHandler,
};

/// ALPN protocol identifier negotiated during the QUIC/TLS handshake.
const ALPN_PROTOCOL: &[u8] = b"framecore";

/// Accepts inbound QUIC connections and drives one session per connection.
///
/// On each accepted connection the acceptor opens a single bidirectional
/// stream, builds a [`Framer`] from `framer_config`, wraps it in a
/// [`Session`], registers the session with `manager`, and spawns its
/// read/write loops.
pub struct QuicAcceptor<H: SessionHandler<SystemEnv>> {
    endpoint: Endpoint,
    framer_config: FramerConfig,
    manager: Arc<SessionManager<SystemEnv>>,
    handler: Arc<H>,
    queue_capacity: usize,
}

impl<H: SessionHandler<SystemEnv>> QuicAcceptor<H> {
    /// Binds a QUIC endpoint. Without `cert_path`/`key_path`, generates a
    /// self-signed certificate suitable only for local testing.
    ///
    /// # Errors
    ///
    /// [`TransportError::Config`] for an invalid address or certificate;
    /// [`TransportError::Connection`] if the endpoint cannot be created.
    pub fn bind(
        address: &str,
        cert_path: Option<&str>,
        key_path: Option<&str>,
        framer_config: FramerConfig,
        manager: Arc<SessionManager<SystemEnv>>,
        handler: Arc<H>,
    ) -> Result<Self> {
        let addr: SocketAddr = address
            .parse()
            .map_err(|e| TransportError::Config(format!("invalid bind address '{address}': {e}")))?;

        let server_config = match (cert_path, key_path) {
            (Some(cert), Some(key)) => load_tls_config(cert, key)?,
            _ => generate_self_signed_config()?,
        };

        let endpoint = Endpoint::server(server_config, addr)
            .map_err(|e| TransportError::Connection(format!("failed to create endpoint: {e}")))?;

        tracing::info!(%addr, "QUIC acceptor bound");

        Ok(Self { endpoint, framer_config, manager, handler, queue_capacity: DEFAULT_QUEUE_CAPACITY })
    }

    /// Overrides the default per-session queue capacity.
    #[must_use]
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Local address the endpoint is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.endpoint
            .local_addr()
            .map_err(|e| TransportError::Connection(format!("local_addr failed: {e}")))
    }
}

impl<H: SessionHandler<SystemEnv>> Acceptor for QuicAcceptor<H> {
    /// Accepts connections until the endpoint is closed. Each connection
    /// spawns its own session tasks and this method does not wait for them.
    async fn start(&self) -> Result<()> {
        while let Some(incoming) = self.endpoint.accept().await {
            let connection = match incoming.await {
                Ok(connection) => connection,
                Err(err) => {
                    tracing::warn!(%err, "QUIC handshake failed");
                    continue;
                },
            };

            let framer_config = self.framer_config.clone();
            let manager = self.manager.clone();
            let handler = self.handler.clone();
            let queue_capacity = self.queue_capacity;

            tokio::spawn(async move {
                if let Err(err) =
                    serve_connection(connection, framer_config, manager, handler, queue_capacity)
                        .await
                {
                    tracing::warn!(%err, "connection handling failed");
                }
            });
        }

        Ok(())
    }

    /// Stops accepting new connections. Sessions already spawned continue
    /// running until their own cancellation or peer close.
    async fn stop(&self) -> Result<()> {
        self.endpoint.close(0u32.into(), b"shutting down");
        Ok(())
    }
}

async fn serve_connection<H: SessionHandler<SystemEnv>>(
    connection: quinn::Connection,
    framer_config: FramerConfig,
    manager: Arc<SessionManager<SystemEnv>>,
    handler: Arc<H>,
    queue_capacity: usize,
) -> Result<()> {
    let remote_addr = connection.remote_address().to_string();
    let (send, recv) = connection
        .accept_bi()
        .await
        .map_err(|e| TransportError::Connection(format!("accept_bi failed: {e}")))?;

    let framer = Framer::new(SystemEnv::new(), framer_config)
        .map_err(|e| TransportError::Config(e.to_string()))?;
    let (session, outbound) =
        Session::new_with_capacity(remote_addr, framer, queue_capacity);
    let session = Arc::new(session);

    manager.add(session.clone()).await;
    handler.on_opened(&session);

    let writer_session = session.clone();
    let writer = tokio::spawn(run_write_loop(writer_session, send, outbound));

    run_read_loop(session.clone(), recv, handler.clone()).await;

    session.close().await;
    manager.remove(session.id()).await;
    handler.on_closed(&session, None);

    writer.abort();
    Ok(())
}

/// Opens outbound QUIC connections as a client.
///
/// The client's TLS server name is derived from the host portion of the
/// address passed to [`Connector::connect`] (everything before the final
/// `:port`), since QUIC's handshake needs it separately from the socket
/// address.
pub struct QuicConnector<H: SessionHandler<SystemEnv>> {
    endpoint: Endpoint,
    framer_config: FramerConfig,
    handler: Arc<H>,
    queue_capacity: usize,
}

impl<H: SessionHandler<SystemEnv>> QuicConnector<H> {
    /// Creates a client endpoint. Every connection made through this
    /// connector uses `framer_config` and reports to `handler`.
    ///
    /// # Errors
    ///
    /// [`TransportError::Connection`] if the client endpoint cannot be
    /// created.
    pub fn new(framer_config: FramerConfig, handler: Arc<H>) -> Result<Self> {
        let mut endpoint = Endpoint::client("0.0.0.0:0".parse().unwrap())
            .map_err(|e| TransportError::Connection(format!("failed to create endpoint: {e}")))?;

        let client_config = client_config()?;
        endpoint.set_default_client_config(client_config);

        Ok(Self { endpoint, framer_config, handler, queue_capacity: DEFAULT_QUEUE_CAPACITY })
    }

    /// Overrides the default per-session queue capacity.
    #[must_use]
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }
}

impl<H: SessionHandler<SystemEnv>> Connector for QuicConnector<H> {
    /// Connects to `addr` (`host:port`), opens one bidirectional stream,
    /// and spawns that session's read and write loops.
    async fn connect(&self, addr: &str) -> Result<Arc<Session<SystemEnv>>> {
        let socket_addr: SocketAddr = addr
            .parse()
            .map_err(|e| TransportError::Config(format!("invalid address '{addr}': {e}")))?;
        let server_name = addr
            .rsplit_once(':')
            .map_or(addr, |(host, _port)| host);

        let connection = self
            .endpoint
            .connect(socket_addr, server_name)
            .map_err(|e| TransportError::Connection(format!("connect failed: {e}")))?
            .await
            .map_err(|e| TransportError::Connection(format!("handshake failed: {e}")))?;

        let (send, recv) = connection
            .open_bi()
            .await
            .map_err(|e| TransportError::Connection(format!("open_bi failed: {e}")))?;

        let framer = Framer::new(SystemEnv::new(), self.framer_config.clone())
            .map_err(|e| TransportError::Config(e.to_string()))?;
        let (session, outbound) =
            Session::new_with_capacity(addr.to_string(), framer, self.queue_capacity);
        let session = Arc::new(session);

        self.handler.on_opened(&session);

        let writer_session = session.clone();
        tokio::spawn(run_write_loop(writer_session, send, outbound));

        let reader_session = session.clone();
        let reader_handler = self.handler.clone();
        tokio::spawn(async move {
            run_read_loop(reader_session.clone(), recv, reader_handler.clone()).await;
            reader_session.close().await;
            reader_handler.on_closed(&reader_session, None);
        });

        Ok(session)
    }
}

/// Builds a client TLS config trusting an empty root store. Connecting to
/// a server using a certificate signed by a real CA requires populating
/// `roots` from the platform trust store; this reference adapter leaves
/// that to the caller's deployment since it targets the self-signed
/// development path exercised by [`QuicAcceptor::bind`].
fn client_config() -> Result<ClientConfig> {
    let roots = rustls::RootCertStore::empty();

    let mut tls_config = rustls::ClientConfig::builder()
        .with_root_certificates(roots)
        .with_no_client_auth();
    tls_config.alpn_protocols = vec![ALPN_PROTOCOL.to_vec()];

    let client_config = ClientConfig::new(Arc::new(
        quinn::crypto::rustls::QuicClientConfig::try_from(tls_config)
            .map_err(|e| TransportError::Config(format!("QUIC client config error: {e}")))?,
    ));

    Ok(client_config)
}

fn load_tls_config(cert_path: &str, key_path: &str) -> Result<ServerConfig> {
    use std::fs;

    let cert_pem = fs::read(cert_path)
        .map_err(|e| TransportError::Config(format!("failed to read cert '{cert_path}': {e}")))?;
    let key_pem = fs::read(key_path)
        .map_err(|e| TransportError::Config(format!("failed to read key '{key_path}': {e}")))?;

    let certs = rustls_pemfile::certs(&mut &cert_pem[..])
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| TransportError::Config(format!("failed to parse certificates: {e}")))?;

    let key = rustls_pemfile::private_key(&mut &key_pem[..])
        .map_err(|e| TransportError::Config(format!("failed to parse private key: {e}")))?
        .ok_or_else(|| TransportError::Config("no private key found".to_string()))?;

    let mut tls_config = rustls::ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .map_err(|e| TransportError::Config(format!("invalid TLS config: {e}")))?;
    tls_config.alpn_protocols = vec![ALPN_PROTOCOL.to_vec()];

    Ok(ServerConfig::with_crypto(Arc::new(
        quinn::crypto::rustls::QuicServerConfig::try_from(tls_config)
            .map_err(|e| TransportError::Config(format!("QUIC config error: {e}")))?,
    )))
}

fn generate_self_signed_config() -> Result<ServerConfig> {
    let cert = rcgen::generate_simple_self_signed(vec!["localhost".to_string()])
        .map_err(|e| TransportError::Config(format!("failed to generate self-signed cert: {e}")))?;

    let cert_der = cert.cert.der().clone();
    let key_der = cert.key_pair.serialize_der();

    let cert_chain = vec![cert_der];
    let key = rustls::pki_types::PrivatePkcs8KeyDer::from(key_der);

    let mut tls_config = rustls::ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(cert_chain, key.into())
        .map_err(|e| TransportError::Config(format!("invalid TLS config: {e}")))?;
    tls_config.alpn_protocols = vec![ALPN_PROTOCOL.to_vec()];

    tracing::warn!("using self-signed certificate - not for production use");

    Ok(ServerConfig::with_crypto(Arc::new(
        quinn::crypto::rustls::QuicServerConfig::try_from(tls_config)
            .map_err(|e| TransportError::Config(format!("QUIC config error: {e}")))?,
    )))
}
