//! Monotonic time sources for the timer-driven animations.
//!
//! Animations never read the system clock directly. They receive timestamps (durations
//! since the source's origin) from a [`TimeSource`], so the same state machines run
//! against wall-clock time in the binary and against a hand-advanced clock in tests.

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Trait for abstracting time operations.
pub trait TimeSource: Send + Sync {
    /// Time elapsed since the source was created.
    fn now(&self) -> Duration;

    /// Sleep for the given duration (or pretend to).
    fn sleep(&self, duration: Duration);
}

/// Wall-clock time backed by [`Instant`].
pub struct RealTimeSource {
    origin: Instant,
}

impl RealTimeSource {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for RealTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for RealTimeSource {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Clock that only advances when [`advance`](Self::advance) or `sleep` is called.
///
/// This is the fake timer used to step animations deterministically.
#[derive(Default)]
pub struct ManualTimeSource {
    current: Mutex<Duration>,
}

impl ManualTimeSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward and return the new timestamp.
    pub fn advance(&self, by: Duration) -> Duration {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        *current += by;
        *current
    }

    pub fn advance_ms(&self, millis: u64) -> Duration {
        self.advance(Duration::from_millis(millis))
    }

    /// Jump to an absolute timestamp. Time never moves backwards.
    pub fn set(&self, at: Duration) {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        *current = (*current).max(at);
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> Duration {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_source_only_moves_when_advanced() {
        let time = ManualTimeSource::new();
        assert_eq!(time.now(), Duration::ZERO);

        time.advance_ms(1500);
        assert_eq!(time.now(), Duration::from_millis(1500));

        time.sleep(Duration::from_millis(600));
        assert_eq!(time.now(), Duration::from_millis(2100));
    }

    #[test]
    fn test_manual_source_never_rewinds() {
        let time = ManualTimeSource::new();
        time.advance_ms(100);
        time.set(Duration::from_millis(50));
        assert_eq!(time.now(), Duration::from_millis(100));
        time.set(Duration::from_millis(250));
        assert_eq!(time.now(), Duration::from_millis(250));
    }

    #[test]
    fn test_real_source_is_monotonic() {
        let time = RealTimeSource::new();
        let first = time.now();
        let second = time.now();
        assert!(second >= first);
    }
}
