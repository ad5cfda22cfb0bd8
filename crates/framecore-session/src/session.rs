//! Per-connection session: identity, bounded queues, and lifecycle.

use std::sync::atomic::{AtomicU64, Ordering};

use framecore::{Environment, Framer};
use framecore_proto::Envelope;
use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::{Result, SessionError};

/// Lifecycle state of a [`Session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Accepting sends and receives.
    Open,
    /// Draining outstanding sends; no new sends accepted.
    Closing,
    /// Fully torn down.
    Closed,
}

/// A single connection's framing state, identity, and traffic queues.
///
/// Outbound frames are pushed onto a bounded queue that a transport adapter
/// drains in order (FIFO is guaranteed by the single-consumer `mpsc`
/// channel). Inbound frames are pushed by the adapter's read loop and are
/// never allowed to block it: a full `recv` queue drops the newest frame and
/// logs a warning rather than stalling the connection.
pub struct Session<E: Environment> {
    id: String,
    remote_addr: String,
    framer: Framer<E>,
    send_tx: mpsc::Sender<Envelope>,
    recv_tx: mpsc::Sender<Envelope>,
    recv_rx: Mutex<mpsc::Receiver<Envelope>>,
    cancel: CancellationToken,
    state: Mutex<SessionState>,
    dropped_received: AtomicU64,
}

/// Queue depth defaults; callers may size differently via
/// [`Session::new_with_capacity`].
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

impl<E: Environment> Session<E> {
    /// Creates a session with the default queue capacity. Returns the
    /// session and the receiver end of its outbound queue, which the
    /// caller's write loop must drain.
    pub fn new(remote_addr: String, framer: Framer<E>) -> (Self, mpsc::Receiver<Envelope>) {
        Self::new_with_capacity(remote_addr, framer, DEFAULT_QUEUE_CAPACITY)
    }

    /// Creates a session with an explicit bounded queue capacity for both
    /// the send and receive directions.
    pub fn new_with_capacity(
        remote_addr: String,
        framer: Framer<E>,
        capacity: usize,
    ) -> (Self, mpsc::Receiver<Envelope>) {
        let (send_tx, send_rx) = mpsc::channel(capacity);
        let (recv_tx, recv_rx) = mpsc::channel(capacity);

        let session = Self {
            id: Uuid::new_v4().to_string(),
            remote_addr,
            framer,
            send_tx,
            recv_tx,
            recv_rx: Mutex::new(recv_rx),
            cancel: CancellationToken::new(),
            state: Mutex::new(SessionState::Open),
            dropped_received: AtomicU64::new(0),
        };

        (session, send_rx)
    }

    /// Session identity, a UUID string assigned at construction.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The peer address this session was opened for.
    #[must_use]
    pub fn remote_addr(&self) -> &str {
        &self.remote_addr
    }

    /// Current lifecycle state.
    pub async fn state(&self) -> SessionState {
        *self.state.lock().await
    }

    /// The cancellation context driver loops should race against.
    #[must_use]
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Count of inbound frames dropped because the receive queue was full.
    pub fn dropped_received_count(&self) -> u64 {
        self.dropped_received.load(Ordering::Relaxed)
    }

    /// Encodes `payload` under `op` and enqueues it for the write loop.
    ///
    /// Blocks the caller under back-pressure from a full queue, but never
    /// past the session's cancellation: once cancelled (or once `close()`
    /// has run), this returns [`SessionError::ConnectionClosed`] instead of
    /// waiting forever on a writer that is no longer draining the queue.
    ///
    /// # Errors
    ///
    /// [`SessionError::EncodeFailed`] if the framer rejects the frame.
    /// [`SessionError::ConnectionClosed`] if cancelled before enqueuing.
    pub async fn send(&self, op: u32, payload: &[u8]) -> Result<()> {
        let envelope = self.framer.encode(op, payload)?;

        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(SessionError::ConnectionClosed),
            result = self.send_tx.send(envelope) => result.map_err(|_| SessionError::ConnectionClosed),
        }
    }

    /// Decodes a raw envelope through this session's framer without
    /// touching the receive queue. Callers that want queued, poll-driven
    /// delivery should use [`Self::push_received`] and [`Self::recv`].
    ///
    /// # Errors
    ///
    /// Propagates [`framecore::FramerError`] from the decode pipeline.
    pub fn decode(&self, envelope: &Envelope) -> std::result::Result<(u32, Vec<u8>), framecore::FramerError> {
        self.framer.decode(envelope)
    }

    /// Hands a decoded-ready envelope to the receive queue. Non-blocking:
    /// if the queue is full the frame is dropped and a warning is logged,
    /// rather than stalling the adapter's read loop.
    pub fn push_received(&self, envelope: Envelope) {
        if self.recv_tx.try_send(envelope).is_err() {
            self.dropped_received.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(session_id = %self.id, "receive queue full, dropping frame");
        }
    }

    /// Pulls the next received envelope, or `None` once the queue is
    /// closed and drained.
    pub async fn recv(&self) -> Option<Envelope> {
        self.recv_rx.lock().await.recv().await
    }

    /// Transitions `Open -> Closing -> Closed`, cancelling the session's
    /// context so in-flight sends unblock. Idempotent: closing an
    /// already-closed session is a no-op.
    pub async fn close(&self) {
        let mut state = self.state.lock().await;
        if *state == SessionState::Closed {
            return;
        }
        *state = SessionState::Closing;
        self.cancel.cancel();
        *state = SessionState::Closed;
    }
}
