//! One-per-cooldown submission ledger keyed by normalized email.
//!
//! Unlike the fixed-window counter this keeps only the last accepted
//! submission time. A claim is taken atomically before the expensive work
//! starts and released again unless that work commits it, including when the
//! request future is dropped half way.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::access::clock::Clock;

pub const SUBMISSION_COOLDOWN: Duration = Duration::from_secs(30 * 24 * 60 * 60);

#[derive(Debug)]
pub struct SubmissionLedger {
    last_seen: DashMap<String, Instant>,
    cooldown: Duration,
    clock: Arc<dyn Clock>,
}

/// A pending claim. Dropping it without [`ClaimGuard::commit`] releases the
/// slot, so a failed or abandoned submission never starts the cooldown.
#[derive(Debug)]
#[must_use = "dropping the guard releases the claim"]
pub struct ClaimGuard<'a> {
    ledger: &'a SubmissionLedger,
    email: String,
    at: Instant,
    committed: bool,
}

impl ClaimGuard<'_> {
    /// Keeps the claim: the cooldown now runs from the time it was taken.
    pub fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for ClaimGuard<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.ledger.release(&self.email, self.at);
        }
    }
}

impl SubmissionLedger {
    pub fn new(cooldown: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            last_seen: DashMap::new(),
            cooldown,
            clock,
        }
    }

    /// Takes the slot for `email` unless a submission was accepted within the
    /// cooldown. On refusal returns the time left until the next allowed one.
    pub fn claim(&self, email: &str) -> Result<ClaimGuard<'_>, Duration> {
        let now = self.clock.now();
        match self.last_seen.entry(email.to_string()) {
            Entry::Occupied(mut seen) => {
                let age = now.saturating_duration_since(*seen.get());
                if age < self.cooldown {
                    return Err(self.cooldown - age);
                }
                seen.insert(now);
            }
            Entry::Vacant(slot) => {
                slot.insert(now);
            }
        }
        Ok(ClaimGuard {
            ledger: self,
            email: email.to_string(),
            at: now,
            committed: false,
        })
    }

    /// A newer claim for the same email is left alone.
    fn release(&self, email: &str, at: Instant) {
        self.last_seen.remove_if(email, |_, seen| *seen == at);
    }

    #[cfg(test)]
    pub fn last_seen(&self, email: &str) -> Option<Instant> {
        self.last_seen.get(email).map(|t| *t)
    }
}
