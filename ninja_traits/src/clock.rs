use std::thread;
use std::time::{Duration, Instant};

use crate::cancel::CancelToken;

/// Granularity used by [`Clock::nap`] when watching a cancel token.
pub const NAP_SLICE: Duration = Duration::from_millis(5);

/// Monotonic clock abstraction shared by gait workers and the watchdog.
///
/// - now(): returns a monotonic Instant
/// - sleep(): sleeps for the provided duration (implementations may simulate)
/// - nap(): sleeps but wakes early once a cancel token is set
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, d: Duration);

    /// Milliseconds elapsed since `epoch`, saturating at 0 on underflow.
    fn ms_since(&self, epoch: Instant) -> u64 {
        let dur = self.now().saturating_duration_since(epoch);
        u64::try_from(dur.as_millis()).unwrap_or(u64::MAX)
    }

    /// Sleep for up to `d`, returning `false` early if `cancel` is observed set.
    ///
    /// Returns `true` when the full duration elapsed without cancellation.
    fn nap(&self, d: Duration, cancel: &CancelToken) -> bool {
        let deadline = self.now() + d;
        loop {
            if cancel.is_cancelled() {
                return false;
            }
            let now = self.now();
            if now >= deadline {
                return true;
            }
            self.sleep(NAP_SLICE.min(deadline - now));
        }
    }
}

/// Default, real-time monotonic clock backed by std::time::Instant.
#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock;

impl MonotonicClock {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }

    #[inline]
    fn sleep(&self, d: Duration) {
        if d.is_zero() {
            return;
        }
        thread::sleep(d);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nap_runs_full_duration_when_not_cancelled() {
        let clock = MonotonicClock::new();
        let token = CancelToken::new();
        let start = Instant::now();
        assert!(clock.nap(Duration::from_millis(20), &token));
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn nap_returns_early_when_cancelled() {
        let clock = MonotonicClock::new();
        let token = CancelToken::new();
        let remote = token.clone();
        let setter = thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            remote.cancel();
        });
        let start = Instant::now();
        assert!(!clock.nap(Duration::from_secs(5), &token));
        assert!(start.elapsed() < Duration::from_secs(1));
        setter.join().unwrap();
    }

    #[test]
    fn ms_since_saturates_for_future_epoch() {
        let clock = MonotonicClock::new();
        let future = Instant::now() + Duration::from_secs(60);
        assert_eq!(clock.ms_since(future), 0);
    }
}
