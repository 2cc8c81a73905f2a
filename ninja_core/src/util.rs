//! Bounded-join helpers for worker threads.

use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// How often a bounded join re-checks `is_finished`.
pub const JOIN_POLL: Duration = Duration::from_millis(2);

/// Result of waiting on a worker thread with a deadline.
#[derive(Debug)]
pub enum JoinOutcome<T> {
    /// Thread exited and returned a value.
    Joined(T),
    /// Thread exited by panicking.
    Panicked,
    /// Deadline passed; the thread is left detached.
    TimedOut,
}

impl<T> JoinOutcome<T> {
    pub fn is_timed_out(&self) -> bool {
        matches!(self, JoinOutcome::TimedOut)
    }
}

/// Wait for `handle` to finish for at most `timeout`.
///
/// std offers no timed join, so this polls `is_finished` and only calls the
/// blocking `join` once the thread is known to have exited. On timeout the
/// handle is dropped, detaching the thread.
pub fn join_with_timeout<T>(handle: JoinHandle<T>, timeout: Duration) -> JoinOutcome<T> {
    let deadline = Instant::now() + timeout;
    while !handle.is_finished() {
        if Instant::now() >= deadline {
            return JoinOutcome::TimedOut;
        }
        std::thread::sleep(JOIN_POLL);
    }
    match handle.join() {
        Ok(v) => JoinOutcome::Joined(v),
        Err(_) => JoinOutcome::Panicked,
    }
}

/// Milliseconds to `Duration`, the unit every knob in the config uses.
#[inline]
pub fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn joins_finished_thread() {
        let h = std::thread::spawn(|| 7);
        match join_with_timeout(h, Duration::from_millis(500)) {
            JoinOutcome::Joined(v) => assert_eq!(v, 7),
            other => panic!("expected Joined, got {other:?}"),
        }
    }

    #[test]
    fn times_out_on_stuck_thread() {
        let release = Arc::new(AtomicBool::new(false));
        let r = release.clone();
        let h = std::thread::spawn(move || {
            while !r.load(Ordering::Relaxed) {
                std::thread::sleep(Duration::from_millis(1));
            }
        });
        let start = Instant::now();
        assert!(join_with_timeout(h, Duration::from_millis(20)).is_timed_out());
        assert!(start.elapsed() < Duration::from_millis(200));
        release.store(true, Ordering::Relaxed);
    }

    #[test]
    fn reports_panics() {
        let h = std::thread::spawn(|| panic!("boom"));
        assert!(matches!(
            join_with_timeout(h, Duration::from_millis(500)),
            JoinOutcome::Panicked
        ));
    }
}
