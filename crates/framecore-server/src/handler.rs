//! Default session handler.

use std::sync::Arc;

use framecore::SystemEnv;
use framecore_session::Session;
use framecore_transport::{SessionHandler, TransportError};

/// Logs session lifecycle events and received messages via `tracing`.
///
/// This is the reference handler wired up by [`crate::Server`]; it does not
/// interpret message payloads, it only reports them.
#[derive(Debug, Default)]
pub struct LoggingHandler;

impl SessionHandler<SystemEnv> for LoggingHandler {
    fn on_opened(&self, session: &Arc<Session<SystemEnv>>) {
        tracing::info!(session_id = %session.id(), remote = %session.remote_addr(), "session opened");
    }

    fn on_message(&self, session: &Arc<Session<SystemEnv>>, op: u32, payload: Vec<u8>) {
        tracing::debug!(
            session_id = %session.id(),
            op,
            payload_len = payload.len(),
            "message received"
        );
    }

    fn on_error(&self, session: &Arc<Session<SystemEnv>>, err: &TransportError) {
        tracing::warn!(session_id = %session.id(), %err, "session error");
    }

    fn on_closed(&self, session: &Arc<Session<SystemEnv>>, err: Option<&TransportError>) {
        match err {
            Some(err) => {
                tracing::info!(session_id = %session.id(), %err, "session closed with error")
            },
            None => tracing::info!(session_id = %session.id(), "session closed"),
        }
    }
}
