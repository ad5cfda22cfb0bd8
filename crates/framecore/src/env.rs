//! Environment abstraction for deterministic testing.
//!
//! Decouples the framer and sequence-id manager from system resources (time,
//! randomness) so tests can supply a fake clock and a seeded RNG while
//! production uses real system resources.

use std::time::Duration;

/// Abstract environment providing time and randomness.
///
/// # Invariants
///
/// Implementations MUST guarantee:
/// - `now_unix_seconds()` is monotonically non-decreasing within a process.
/// - `random_bytes()` uses cryptographically secure entropy in production.
pub trait Environment: Clone + Send + Sync + 'static {
    /// Current wall-clock time in Unix seconds, used for `timestamp` at
    /// encode time and for the time gates in decode and replay validation.
    fn now_unix_seconds(&self) -> u64;

    /// Sleeps for the specified duration. The only async method in the
    /// trait; used by driver code, never by pure encode/decode logic.
    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send;

    /// Fills `buffer` with random bytes (cryptographically secure in
    /// production; deterministic in test environments).
    fn random_bytes(&self, buffer: &mut [u8]);
}

/// Production environment using system time and cryptographic RNG.
///
/// # Panics
///
/// [`Environment::random_bytes`] panics if the OS RNG fails. A server
/// without functioning cryptographic randomness cannot operate securely, so
/// continuing with a degraded RNG source is worse than aborting.
#[derive(Clone, Copy, Default)]
pub struct SystemEnv;

impl SystemEnv {
    /// Creates a new system environment.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Environment for SystemEnv {
    #[allow(clippy::expect_used)]
    fn now_unix_seconds(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("invariant: system clock is after Unix epoch (1970-01-01)")
            .as_secs()
    }

    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }

    #[allow(clippy::expect_used)]
    fn random_bytes(&self, buffer: &mut [u8]) {
        getrandom::fill(buffer)
            .expect("invariant: OS RNG failure is unrecoverable - server cannot operate securely");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_env_time_is_plausible() {
        let env = SystemEnv::new();
        let now = env.now_unix_seconds();
        // Comfortably bounds "now" between 2020-01-01 and 2100-01-01.
        assert!(now > 1_577_836_800);
        assert!(now < 4_102_444_800);
    }

    #[test]
    fn system_env_random_bytes_are_random() {
        let env = SystemEnv::new();
        let mut a = [0u8; 32];
        let mut b = [0u8; 32];
        env.random_bytes(&mut a);
        env.random_bytes(&mut b);
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn system_env_sleep_waits_at_least_requested_duration() {
        let env = SystemEnv::new();
        let start = std::time::Instant::now();
        env.sleep(Duration::from_millis(20)).await;
        assert!(start.elapsed() >= Duration::from_millis(20));
    }
}
