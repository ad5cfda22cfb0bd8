//! The client side of the transport adapter contract.

use std::sync::Arc;

use framecore::SystemEnv;
use framecore_session::Session;

use crate::error::Result;

/// Opens an outbound connection and returns the resulting session, with its
/// read and write loops already running.
pub trait Connector: Send + Sync {
    /// Connects to `addr` and returns the open session.
    fn connect(
        &self,
        addr: &str,
    ) -> impl std::future::Future<Output = Result<Arc<Session<SystemEnv>>>> + Send;
}
