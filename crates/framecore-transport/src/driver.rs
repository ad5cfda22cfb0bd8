//! Read/write loop shared by every concrete adapter.
//!
//! A concrete adapter (see [`crate::quic`]) is responsible only for
//! producing a byte stream per session; this module owns the envelope
//! unmarshal/decode/dispatch loop and the queue-draining write loop that run
//! on top of it, so each adapter does not have to reimplement them.

use std::sync::Arc;

use framecore::Environment;
use framecore_proto::Envelope;
use framecore_session::Session;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::{
    error::TransportError,
    framing::{read_framed, write_framed},
    handler::SessionHandler,
};

/// Frame length ceiling enforced by [`run_read_loop`] before allocating a
/// buffer for the peer's declared length.
pub const MAX_FRAME_BYTES: u32 = 16 * 1024 * 1024;

/// Drains `session`'s outbound queue onto `writer` until the queue closes
/// (the session was dropped) or the session is cancelled.
pub async fn run_write_loop<E, W>(
    session: Arc<Session<E>>,
    mut writer: W,
    mut outbound: tokio::sync::mpsc::Receiver<Envelope>,
) where
    E: Environment,
    W: AsyncWrite + Unpin,
{
    loop {
        let envelope = tokio::select! {
            biased;
            () = session.cancellation_token().cancelled() => break,
            envelope = outbound.recv() => match envelope {
                Some(envelope) => envelope,
                None => break,
            },
        };

        let bytes = match envelope.marshal() {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!(session_id = %session.id(), %err, "failed to marshal outbound envelope");
                continue;
            },
        };

        if let Err(err) = write_framed(&mut writer, &bytes).await {
            tracing::debug!(session_id = %session.id(), %err, "write loop exiting");
            break;
        }
    }
}

/// Reads length-prefixed envelopes from `reader`, decodes each through the
/// session's framer, and both queues it (`push_received`) and invokes
/// `handler.on_message`. Exits on a clean peer-initiated close, a read
/// error, or session cancellation.
pub async fn run_read_loop<E, R, H>(session: Arc<Session<E>>, mut reader: R, handler: Arc<H>)
where
    E: Environment,
    R: AsyncRead + Unpin,
    H: SessionHandler<E>,
{
    loop {
        let read = tokio::select! {
            biased;
            () = session.cancellation_token().cancelled() => break,
            read = read_framed(&mut reader, MAX_FRAME_BYTES) => read,
        };

        let bytes = match read {
            Ok(Some(bytes)) => bytes,
            Ok(None) => break,
            Err(err) => {
                handler.on_error(&session, &err);
                break;
            },
        };

        let envelope = match Envelope::unmarshal(&bytes) {
            Ok(envelope) => envelope,
            Err(err) => {
                handler.on_error(&session, &TransportError::Io(err.to_string()));
                continue;
            },
        };

        match session.decode(&envelope) {
            Ok((op, payload)) => {
                session.push_received(envelope);
                handler.on_message(&session, op, payload);
            },
            Err(err) => {
                handler.on_error(&session, &TransportError::Io(err.to_string()));
            },
        }
    }
}
