//! The server side of the transport adapter contract.

use crate::error::Result;

/// Accepts inbound connections and drives a session per connection.
///
/// Binding, certificate/key material, and the session handler are adapter
/// and construction-time concerns; this trait covers only the run/stop
/// lifecycle every acceptor shares.
pub trait Acceptor: Send + Sync {
    /// Runs the accept loop. Returns once the underlying listener stops
    /// yielding new connections (e.g. after [`Acceptor::stop`]).
    fn start(&self) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Stops accepting new connections. Sessions already in flight are
    /// unaffected; they close on their own cancellation or peer close.
    fn stop(&self) -> impl std::future::Future<Output = Result<()>> + Send;
}
