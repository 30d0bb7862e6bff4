//! Time sources for debounce and banner timing.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Trait representing a monotonic time source.
///
/// The session and playback controller read time only through this trait,
/// so replays and tests can drive debounce windows deterministically.
pub trait TimeSource: Send + Sync {
    fn now(&self) -> Instant;
}

/// Default time source backed by `Instant::now`.
#[derive(Default)]
pub struct SystemTimeSource {
    _unit: (),
}

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Manually driven time source for fixture replays and tests.
///
/// Time only moves when `advance` or `set_elapsed` is called.
pub struct ManualTimeSource {
    start: Instant,
    offset_ms: AtomicU64,
}

impl ManualTimeSource {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            offset_ms: AtomicU64::new(0),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.offset_ms
            .fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }

    /// Jump to an absolute offset from the origin. Never moves backwards.
    pub fn set_elapsed(&self, elapsed: Duration) {
        self.offset_ms
            .fetch_max(elapsed.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.offset_ms.load(Ordering::SeqCst))
    }
}

impl Default for ManualTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> Instant {
        self.start + self.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_only_moves_when_told() {
        let clock = ManualTimeSource::new();
        let t0 = clock.now();
        assert_eq!(clock.now(), t0);
        clock.advance(Duration::from_millis(250));
        assert_eq!(clock.now() - t0, Duration::from_millis(250));
    }

    #[test]
    fn manual_clock_is_monotonic() {
        let clock = ManualTimeSource::new();
        clock.set_elapsed(Duration::from_millis(900));
        clock.set_elapsed(Duration::from_millis(100));
        assert_eq!(clock.elapsed(), Duration::from_millis(900));
    }

    #[test]
    fn system_clock_advances() {
        let clock = SystemTimeSource::default();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
