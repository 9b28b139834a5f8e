//! Single-use concierge sessions issued by the gated start endpoint.
//!
//! Submitting answers requires a session that was issued to the same email
//! and has not expired, so the geofence and quota cannot be bypassed by
//! posting answers directly. A redeemed session is only spent once the
//! protocol has gone out; until then it is held by a [`Redemption`] that puts
//! it back when dropped.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use uuid::Uuid;

use crate::access::clock::Clock;

pub const SESSION_TTL: Duration = Duration::from_secs(2 * 60 * 60);

#[derive(Debug, Clone)]
struct SessionRecord {
    email: String,
    issued_at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedeemError {
    Unknown,
    Expired,
    EmailMismatch,
}

/// A session taken out of the registry. Dropping it without
/// [`Redemption::commit`] restores the session unchanged, original TTL included.
#[derive(Debug)]
#[must_use = "dropping the redemption restores the session"]
pub struct Redemption<'a> {
    registry: &'a SessionRegistry,
    id: Uuid,
    record: Option<SessionRecord>,
}

impl Redemption<'_> {
    /// Spends the session for good.
    pub fn commit(mut self) {
        self.record = None;
    }
}

impl Drop for Redemption<'_> {
    fn drop(&mut self) {
        if let Some(record) = self.record.take() {
            self.registry.sessions.insert(self.id, record);
        }
    }
}

#[derive(Debug)]
pub struct SessionRegistry {
    sessions: DashMap<Uuid, SessionRecord>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl SessionRegistry {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
            clock,
        }
    }

    /// Issues a new session for a normalized email. Expired sessions are
    /// pruned on the way.
    pub fn issue(&self, email: &str) -> Uuid {
        let now = self.clock.now();
        self.sessions
            .retain(|_, s| now.saturating_duration_since(s.issued_at) < self.ttl);

        let id = Uuid::new_v4();
        self.sessions.insert(
            id,
            SessionRecord {
                email: email.to_string(),
                issued_at: now,
            },
        );
        id
    }

    /// Takes the session out so concurrent submits cannot both use it.
    /// A mismatched email leaves it in place; an expired one is discarded.
    pub fn redeem(&self, id: Uuid, email: &str) -> Result<Redemption<'_>, RedeemError> {
        let now = self.clock.now();
        let record = self
            .sessions
            .remove_if(&id, |_, record| record.email == email)
            .map(|(_, record)| record);
        let Some(record) = record else {
            return Err(if self.sessions.contains_key(&id) {
                RedeemError::EmailMismatch
            } else {
                RedeemError::Unknown
            });
        };
        if now.saturating_duration_since(record.issued_at) >= self.ttl {
            return Err(RedeemError::Expired);
        }
        Ok(Redemption {
            registry: self,
            id,
            record: Some(record),
        })
    }
}
