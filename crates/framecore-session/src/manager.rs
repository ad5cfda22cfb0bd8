//! Registry of live sessions keyed by session id.

use std::{collections::HashMap, sync::Arc};

use framecore::Environment;
use framecore_proto::Envelope;
use tokio::sync::RwLock;

use crate::session::Session;

/// Tracks every open [`Session`] by its identity and supports broadcast.
///
/// Reads (`get`, `count`, `range`) take the read lock; mutations (`add`,
/// `remove`) take the write lock. `broadcast` takes a snapshot of the
/// relevant `Arc<Session>` handles under the read lock, then sends to each
/// one after releasing it, so a slow or blocked session cannot hold up
/// unrelated registry operations.
#[derive(Default)]
pub struct SessionManager<E: Environment> {
    sessions: RwLock<HashMap<String, Arc<Session<E>>>>,
}

impl<E: Environment> SessionManager<E> {
    /// Creates an empty manager.
    #[must_use]
    pub fn new() -> Self {
        Self { sessions: RwLock::new(HashMap::new()) }
    }

    /// Registers a session under its own id, replacing any prior session
    /// that happened to share the id.
    pub async fn add(&self, session: Arc<Session<E>>) {
        self.sessions.write().await.insert(session.id().to_string(), session);
    }

    /// Removes and returns a session by id.
    pub async fn remove(&self, id: &str) -> Option<Arc<Session<E>>> {
        self.sessions.write().await.remove(id)
    }

    /// Looks up a session by id.
    pub async fn get(&self, id: &str) -> Option<Arc<Session<E>>> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Number of registered sessions.
    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Applies `f` to each registered session, stopping early the first
    /// time `f` returns `false`.
    pub async fn range<F>(&self, mut f: F)
    where
        F: FnMut(&Arc<Session<E>>) -> bool,
    {
        for session in self.sessions.read().await.values() {
            if !f(session) {
                break;
            }
        }
    }

    /// Sends `envelope` to every session's outbound queue, optionally
    /// skipping the session whose id matches `exclude` (e.g. the sender,
    /// so it does not receive its own broadcast echoed back).
    ///
    /// Best-effort: a session whose send queue is full or cancelled is
    /// skipped without failing the broadcast for the rest.
    pub async fn broadcast(&self, envelope: &Envelope, exclude: Option<&str>) {
        let targets: Vec<Arc<Session<E>>> = self
            .sessions
            .read()
            .await
            .iter()
            .filter(|(id, _)| exclude != Some(id.as_str()))
            .map(|(_, session)| session.clone())
            .collect();

        for session in targets {
            let (op, payload) = match session.decode(envelope) {
                Ok(decoded) => decoded,
                Err(_) => continue,
            };
            let _ = session.send(op, &payload).await;
        }
    }

    /// Closes every registered session and clears the registry.
    pub async fn close_all(&self) {
        let sessions: Vec<Arc<Session<E>>> =
            self.sessions.write().await.drain().map(|(_, session)| session).collect();
        for session in sessions {
            session.close().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use framecore::{Framer, FramerConfig};

    use super::*;

    #[derive(Clone)]
    struct FakeEnv;

    impl Environment for FakeEnv {
        fn now_unix_seconds(&self) -> u64 {
            1_000
        }

        async fn sleep(&self, _duration: Duration) {}

        fn random_bytes(&self, buffer: &mut [u8]) {
            buffer.fill(0);
        }
    }

    fn framer() -> Framer<FakeEnv> {
        Framer::new(FakeEnv, FramerConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn add_get_remove_round_trip() {
        let manager: SessionManager<FakeEnv> = SessionManager::new();
        let (session, _writer_rx) = Session::new("peer:1".to_string(), framer());
        let id = session.id().to_string();

        manager.add(Arc::new(session)).await;
        assert_eq!(manager.count().await, 1);
        assert!(manager.get(&id).await.is_some());

        manager.remove(&id).await;
        assert_eq!(manager.count().await, 0);
        assert!(manager.get(&id).await.is_none());
    }

    #[tokio::test]
    async fn broadcast_reaches_every_session_except_excluded() {
        let manager: SessionManager<FakeEnv> = SessionManager::new();

        let (sender, mut sender_rx) = Session::new_with_capacity("peer:sender".to_string(), framer(), 4);
        let (peer_a, mut peer_a_rx) = Session::new_with_capacity("peer:a".to_string(), framer(), 4);
        let (peer_b, mut peer_b_rx) = Session::new_with_capacity("peer:b".to_string(), framer(), 4);

        let sender = Arc::new(sender);
        let peer_a = Arc::new(peer_a);
        let peer_b = Arc::new(peer_b);

        manager.add(sender.clone()).await;
        manager.add(peer_a.clone()).await;
        manager.add(peer_b.clone()).await;

        let envelope = framer().encode(10, b"hello").unwrap();
        manager.broadcast(&envelope, Some(sender.id())).await;

        assert!(sender_rx.try_recv().is_err());
        assert!(peer_a_rx.recv().await.is_some());
        assert!(peer_b_rx.recv().await.is_some());
    }

    #[tokio::test]
    async fn close_all_drains_and_empties_the_registry() {
        let manager: SessionManager<FakeEnv> = SessionManager::new();
        let (session, _writer_rx) = Session::new("peer:1".to_string(), framer());
        manager.add(Arc::new(session)).await;

        manager.close_all().await;
        assert_eq!(manager.count().await, 0);
    }
}
