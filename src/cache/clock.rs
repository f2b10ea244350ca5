//! Time source abstraction for the draft cache.
//!
//! Production code uses the system clock; tests drive a manual clock across
//! the TTL boundary.

use std::time::{SystemTime, UNIX_EPOCH};

/// Coarse wall-clock seconds, the only precision the draft cache needs.
pub trait Clock: Send + Sync {
    fn now_secs(&self) -> u64;
}

/// System wall clock.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_secs(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or(0)
    }
}

#[cfg(test)]
pub(crate) mod manual {
    use std::sync::atomic::{AtomicU64, Ordering};

    use super::Clock;

    /// Test clock advanced explicitly by the caller.
    #[derive(Debug, Default)]
    pub struct ManualClock {
        now: AtomicU64,
    }

    impl ManualClock {
        pub fn at(secs: u64) -> Self {
            Self {
                now: AtomicU64::new(secs),
            }
        }

        pub fn set(&self, secs: u64) {
            self.now.store(secs, Ordering::SeqCst);
        }
    }

    impl Clock for ManualClock {
        fn now_secs(&self) -> u64 {
            self.now.load(Ordering::SeqCst)
        }
    }
}
