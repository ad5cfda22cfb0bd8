//! Callbacks an adapter invokes as a session's traffic arrives.

use std::sync::Arc;

use framecore::Environment;
use framecore_session::Session;

use crate::error::TransportError;

/// Observes the lifecycle of one session. An adapter invokes these from
/// whichever task is driving that session's read loop; implementations
/// should not block for long inside a callback, since that stalls the read
/// loop for this session only (other sessions run on independent tasks).
pub trait SessionHandler<E: Environment>: Send + Sync + 'static {
    /// The session was accepted or connected and is ready for traffic.
    fn on_opened(&self, session: &Arc<Session<E>>);

    /// A frame was decoded successfully.
    fn on_message(&self, session: &Arc<Session<E>>, op: u32, payload: Vec<u8>);

    /// A read, decode, or write attempt on this session failed. The
    /// session is not necessarily closed yet.
    fn on_error(&self, session: &Arc<Session<E>>, err: &TransportError);

    /// The session's read loop exited and the session has been closed.
    fn on_closed(&self, session: &Arc<Session<E>>, err: Option<&TransportError>);
}
