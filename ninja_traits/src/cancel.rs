//! Cooperative cancellation flag shared between the supervisor, the running
//! gait worker and its obstacle watchdog.
//!
//! A token can only ever go from un-set to set. Arming a new gait means
//! handing out a brand-new token, so a worker that outlives its bounded join
//! keeps seeing its own flag set and never mistakes a fresh arm for
//! permission to continue.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// A fresh, un-set token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a stop. Idempotent.
    #[inline]
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// True when both handles observe the same underlying flag.
    pub fn same_token(&self, other: &CancelToken) -> bool {
        Arc::ptr_eq(&self.flag, &other.flag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_flag() {
        let a = CancelToken::new();
        let b = a.clone();
        assert!(!b.is_cancelled());
        a.cancel();
        assert!(b.is_cancelled());
        assert!(a.same_token(&b));
    }

    #[test]
    fn fresh_token_is_independent() {
        let old = CancelToken::new();
        old.cancel();
        let fresh = CancelToken::new();
        assert!(!fresh.is_cancelled());
        assert!(old.is_cancelled());
        assert!(!old.same_token(&fresh));
    }
}
