//! Fixed-window request counter keyed by caller identity.
//!
//! Algorithm, per key:
//! 1. No bucket, or bucket age >= window → replace with `{window_start: now, count: 1}`
//! 2. Otherwise → increment `count` in place
//! 3. `allowed = count <= max_requests`
//!
//! Denied calls still count. Buckets are never evicted; the table grows with
//! the number of distinct keys seen during the process lifetime.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::access::clock::Clock;

/// Identity used when the caller supplies an empty key.
pub const GLOBAL_KEY: &str = "global";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateBucket {
    pub window_start: Instant,
    pub count: u32,
}

/// Outcome of a single counter check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowCheck {
    pub allowed: bool,
    pub remaining: u32,
    pub reset_in_ms: u64,
}

/// In-memory bucket table. Owned by `AppState` behind an `Arc` and shared by
/// every gate that rate-limits; gates keep their own key namespaces.
#[derive(Debug)]
pub struct FixedWindowCounter {
    buckets: DashMap<String, RateBucket>,
    clock: Arc<dyn Clock>,
}

impl FixedWindowCounter {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            buckets: DashMap::new(),
            clock,
        }
    }

    /// Counts one request against `key` and reports whether it fits the window.
    ///
    /// The read-check-increment runs while the key's map entry is held, so two
    /// concurrent requests for the same key can never both observe a stale count.
    pub fn check(&self, key: &str, window: Duration, max_requests: u32) -> WindowCheck {
        let key = if key.trim().is_empty() { GLOBAL_KEY } else { key };
        let now = self.clock.now();

        let mut entry = self
            .buckets
            .entry(key.to_string())
            .or_insert(RateBucket {
                window_start: now,
                count: 0,
            });
        let bucket = entry.value_mut();

        if now.saturating_duration_since(bucket.window_start) >= window {
            *bucket = RateBucket {
                window_start: now,
                count: 1,
            };
        } else {
            bucket.count = bucket.count.saturating_add(1);
        }

        let elapsed = now.saturating_duration_since(bucket.window_start);
        WindowCheck {
            allowed: bucket.count <= max_requests,
            remaining: max_requests.saturating_sub(bucket.count),
            reset_in_ms: window.saturating_sub(elapsed).as_millis() as u64,
        }
    }

    /// Snapshot of the bucket for `key`, if one has been created.
    #[cfg(test)]
    pub fn bucket(&self, key: &str) -> Option<RateBucket> {
        self.buckets.get(key).map(|b| *b)
    }
}
