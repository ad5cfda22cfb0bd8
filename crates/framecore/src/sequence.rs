//! Sequence-id generation and replay-window validation (C1).
//!
//! The generator side is lock-free; validation is serialised under a mutex
//! guarding both the `seq_id -> timestamp` map and the FIFO eviction order.

use std::{
    collections::{HashMap, VecDeque},
    sync::{
        Mutex,
        atomic::{AtomicU32, Ordering},
    },
};

/// Replay-window configuration.
#[derive(Debug, Clone, Copy)]
pub struct SequenceConfig {
    /// Maximum entries retained for replay detection.
    pub cache_size: usize,
    /// Seconds past which a seq entry becomes eligible for eviction.
    pub time_window: u64,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self { cache_size: 10_000, time_window: 300 }
    }
}

struct SeqEntry {
    timestamp: u64,
}

struct ReplayState {
    entries: HashMap<u32, SeqEntry>,
    fifo: VecDeque<u32>,
}

/// Generates monotonic per-sender sequence ids and rejects replays of
/// `(seq_id, timestamp)` pairs within the configured window.
pub struct SequenceIdManager {
    counter: AtomicU32,
    config: SequenceConfig,
    state: Mutex<ReplayState>,
}

impl SequenceIdManager {
    /// Builds a manager with the given replay-window configuration.
    #[must_use]
    pub fn new(config: SequenceConfig) -> Self {
        Self {
            counter: AtomicU32::new(0),
            config,
            state: Mutex::new(ReplayState { entries: HashMap::new(), fifo: VecDeque::new() }),
        }
    }

    /// Produces a strictly monotonic value for the local sender. Atomic
    /// increment with zero-skip: if the post-increment value wraps to zero,
    /// it is skipped so `next()` never yields zero.
    pub fn next(&self) -> u32 {
        loop {
            let v = self.counter.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
            if v != 0 {
                return v;
            }
        }
    }

    /// Decides whether an incoming `(seq_id, timestamp)` pair is fresh,
    /// given the caller's notion of "now" (seconds, same epoch as
    /// `timestamp`). Order: time gate, then replay check, then record and
    /// bounded FIFO eviction.
    pub fn validate(&self, seq_id: u32, timestamp: u64, now: u64) -> bool {
        if now.abs_diff(timestamp) > self.config.time_window {
            return false;
        }

        let mut state = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(entry) = state.entries.get(&seq_id) {
            if entry.timestamp == timestamp {
                return false;
            }
        }

        state.entries.insert(seq_id, SeqEntry { timestamp });
        state.fifo.push_back(seq_id);

        while state.fifo.len() > self.config.cache_size {
            #[allow(clippy::expect_used)]
            let evicted = state.fifo.pop_front().expect("fifo length just checked above capacity");
            let evict_from_map = state
                .entries
                .get(&evicted)
                .is_some_and(|e| now.saturating_sub(e.timestamp) > self.config.time_window);
            if evict_from_map {
                state.entries.remove(&evicted);
            }
        }

        true
    }

    /// Number of entries currently retained for replay detection.
    #[must_use]
    pub fn len(&self) -> usize {
        match self.state.lock() {
            Ok(guard) => guard.entries.len(),
            Err(poisoned) => poisoned.into_inner().entries.len(),
        }
    }

    /// Whether the replay window is currently empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::Arc,
        thread,
    };

    use super::*;

    #[test]
    fn next_is_never_zero_and_monotonic() {
        let mgr = SequenceIdManager::new(SequenceConfig::default());
        let mut prev = mgr.next();
        assert_ne!(prev, 0);
        for _ in 0..10_000 {
            let v = mgr.next();
            assert_ne!(v, 0);
            assert!(v > prev || prev == u32::MAX, "sequence must be strictly increasing");
            prev = v;
        }
    }

    #[test]
    fn first_validation_succeeds_and_is_recorded() {
        let mgr = SequenceIdManager::new(SequenceConfig::default());
        assert!(mgr.validate(1, 1000, 1000));
        assert_eq!(mgr.len(), 1);
    }

    #[test]
    fn exact_replay_is_rejected() {
        let mgr = SequenceIdManager::new(SequenceConfig::default());
        assert!(mgr.validate(1, 1000, 1000));
        assert!(!mgr.validate(1, 1000, 1001));
    }

    #[test]
    fn same_seq_id_different_timestamp_is_accepted() {
        let mgr = SequenceIdManager::new(SequenceConfig::default());
        assert!(mgr.validate(1, 1000, 1000));
        assert!(mgr.validate(1, 1001, 1001));
    }

    #[test]
    fn time_gate_rejects_both_directions() {
        let mgr = SequenceIdManager::new(SequenceConfig { cache_size: 10, time_window: 60 });
        assert!(!mgr.validate(1, 1000, 1100));
        assert!(!mgr.validate(1, 1100, 1000));
        assert!(mgr.validate(1, 1050, 1000));
    }

    #[test]
    fn eviction_keeps_cache_bounded_and_retains_fresh_entries() {
        let mgr = SequenceIdManager::new(SequenceConfig { cache_size: 4, time_window: 300 });
        for i in 1..=10u32 {
            assert!(mgr.validate(i, 1000, 1000));
        }
        // All entries are fresh (age 0 <= time_window), so eviction never
        // drops them from the map even though the FIFO only keeps the
        // configured cache_size of ordering state.
        assert_eq!(mgr.len(), 10);
    }

    #[test]
    fn aged_entries_are_evicted_once_fifo_overflows() {
        let mgr = SequenceIdManager::new(SequenceConfig { cache_size: 2, time_window: 10 });
        assert!(mgr.validate(1, 1000, 1000));
        assert!(mgr.validate(2, 1000, 1000));
        // Both entries are now older than time_window relative to `now`.
        assert!(mgr.validate(3, 2000, 2000));
        assert_eq!(mgr.len(), 2, "seq_id 1 should have been evicted, seq_id 2 and 3 retained");
    }

    #[test]
    fn concurrent_next_calls_yield_unique_values() {
        let mgr = Arc::new(SequenceIdManager::new(SequenceConfig::default()));
        let producers = 8;
        let per_producer = 5_000;
        let mut handles = Vec::new();
        for _ in 0..producers {
            let mgr = Arc::clone(&mgr);
            handles.push(thread::spawn(move || {
                let mut values = Vec::with_capacity(per_producer);
                for _ in 0..per_producer {
                    values.push(mgr.next());
                }
                values
            }));
        }

        let mut all = Vec::with_capacity(producers * per_producer);
        for handle in handles {
            all.extend(handle.join().expect("producer thread should not panic"));
        }

        assert_eq!(all.len(), producers * per_producer);
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), producers * per_producer, "next() must never repeat under contention");
    }
}
