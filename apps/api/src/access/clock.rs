//! Time source for the access gate.
//!
//! Production code uses [`SystemClock`]. Tests drive [`MockClock`] by hand so
//! window arithmetic is deterministic.

use std::fmt::Debug;
use std::time::Instant;

/// Monotonic time source shared by the rate-limit store and the submission ledger.
pub trait Clock: Send + Sync + Debug {
    fn now(&self) -> Instant;
}

/// Clock backed by `Instant::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[cfg(test)]
pub use mock::MockClock;
