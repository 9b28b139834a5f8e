//! Access gate: optional geofence followed by fixed-window rate limiting.
//!
//! Order is fixed: location is screened first so out-of-area traffic never
//! consumes quota meant for serviceable clients. The counter is touched only
//! once the location check has passed.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::warn;

use crate::access::distance::{within_radius, GeoPoint};
use crate::access::geo::GeoResolver;
use crate::access::window::FixedWindowCounter;

/// Machine-readable denial reason surfaced to HTTP clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    GeoUnavailable,
    OutsideServiceArea,
    RateLimited,
    InvalidInput,
}

impl ReasonCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasonCode::GeoUnavailable => "GEO_UNAVAILABLE",
            ReasonCode::OutsideServiceArea => "OUTSIDE_SERVICE_AREA",
            ReasonCode::RateLimited => "RATE_LIMITED",
            ReasonCode::InvalidInput => "INVALID_INPUT",
        }
    }
}

/// Single-pass allow/deny result. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AccessDecision {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason_code: Option<ReasonCode>,
    pub remaining: u32,
    pub reset_in_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_miles: Option<f64>,
}

impl AccessDecision {
    pub fn allow(remaining: u32, reset_in_ms: u64, distance_miles: Option<f64>) -> Self {
        Self {
            allowed: true,
            reason_code: None,
            remaining,
            reset_in_ms,
            distance_miles,
        }
    }

    pub fn deny(reason: ReasonCode) -> Self {
        Self {
            allowed: false,
            reason_code: Some(reason),
            remaining: 0,
            reset_in_ms: 0,
            distance_miles: None,
        }
    }

    pub fn rate_limited(reset_in_ms: u64) -> Self {
        Self {
            reset_in_ms,
            ..Self::deny(ReasonCode::RateLimited)
        }
    }

    /// Whole seconds a client should wait, rounded up, for the `Retry-After` header.
    pub fn retry_after_secs(&self) -> u64 {
        self.reset_in_ms.div_ceil(1000)
    }
}

/// Service area: a center point and an inclusive radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geofence {
    pub center: GeoPoint,
    pub radius_miles: f64,
}

/// How a request is mapped onto a rate-limit bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStrategy {
    /// Client address alone.
    Address,
    /// Lower-cased email joined with the client address: `email|address`.
    EmailAndAddress,
}

/// Identity fields the gate needs from an incoming request.
#[derive(Debug, Clone)]
pub struct GateRequest {
    pub address: String,
    pub email: Option<String>,
}

impl GateRequest {
    pub fn from_address(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            email: None,
        }
    }

    pub fn with_email(address: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            email: Some(email.into()),
        }
    }
}

impl KeyStrategy {
    pub fn key_for(&self, request: &GateRequest) -> String {
        match (self, request.email.as_deref()) {
            (KeyStrategy::EmailAndAddress, Some(email)) => {
                format!("{}|{}", email.trim().to_lowercase(), request.address)
            }
            _ => request.address.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GateConfig {
    /// Bucket key prefix; keeps gates that share a counter from colliding.
    pub name: &'static str,
    /// `None` disables geofencing for this gate.
    pub geofence: Option<Geofence>,
    pub window: Duration,
    pub max_requests: u32,
    pub key_strategy: KeyStrategy,
}

impl GateConfig {
    /// Debug probe: 20 requests per minute per address, no geofence.
    pub fn debug_probe() -> Self {
        Self {
            name: "debug",
            geofence: None,
            window: Duration::from_millis(60_000),
            max_requests: 20,
            key_strategy: KeyStrategy::Address,
        }
    }

    /// Concierge session start: 2 per day per email+address, inside the service area.
    pub fn concierge(geofence: Geofence) -> Self {
        Self {
            name: "concierge",
            geofence: Some(geofence),
            window: Duration::from_millis(86_400_000),
            max_requests: 2,
            key_strategy: KeyStrategy::EmailAndAddress,
        }
    }

    pub fn bucket_key(&self, request: &GateRequest) -> String {
        format!("{}:{}", self.name, self.key_strategy.key_for(request))
    }
}

pub struct AccessGate {
    config: GateConfig,
    counter: Arc<FixedWindowCounter>,
    resolver: Arc<dyn GeoResolver>,
}

impl AccessGate {
    pub fn new(
        config: GateConfig,
        counter: Arc<FixedWindowCounter>,
        resolver: Arc<dyn GeoResolver>,
    ) -> Self {
        Self {
            config,
            counter,
            resolver,
        }
    }

    #[cfg(test)]
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Runs the full decision: location screen, then quota.
    pub async fn evaluate(&self, request: &GateRequest) -> AccessDecision {
        let distance_miles = match self.screen_location(&request.address).await {
            Ok(distance) => distance,
            Err(denied) => return denied,
        };

        let key = self.config.bucket_key(request);
        let check = self
            .counter
            .check(&key, self.config.window, self.config.max_requests);

        if !check.allowed {
            warn!(
                gate = self.config.name,
                address = %request.address,
                reset_in_ms = check.reset_in_ms,
                "Rate limit exceeded"
            );
            return AccessDecision {
                allowed: false,
                reason_code: Some(ReasonCode::RateLimited),
                remaining: check.remaining,
                reset_in_ms: check.reset_in_ms,
                distance_miles,
            };
        }

        AccessDecision::allow(check.remaining, check.reset_in_ms, distance_miles)
    }

    /// Geofence check alone. `Ok(None)` when this gate has no geofence,
    /// `Ok(Some(distance))` inside the area, `Err(decision)` on any denial.
    /// Never touches the rate-limit counter.
    pub async fn screen_location(&self, address: &str) -> Result<Option<f64>, AccessDecision> {
        let Some(fence) = self.config.geofence else {
            return Ok(None);
        };

        let resolution = match self.resolver.resolve(address).await {
            Ok(resolution) => resolution,
            Err(failure) => {
                warn!(gate = self.config.name, %address, "Geo lookup failed, denying: {failure}");
                return Err(AccessDecision::deny(ReasonCode::GeoUnavailable));
            }
        };

        let check = within_radius(resolution.point, fence.center, fence.radius_miles);
        if !check.allowed {
            warn!(
                gate = self.config.name,
                %address,
                distance_miles = check.distance_miles,
                "Request outside service area"
            );
            return Err(AccessDecision {
                distance_miles: Some(check.distance_miles),
                ..AccessDecision::deny(ReasonCode::OutsideServiceArea)
            });
        }

        Ok(Some(check.distance_miles))
    }
}
