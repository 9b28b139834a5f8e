//! IP geolocation adapter.
//!
//! Every failure mode (transport error, timeout, provider error body, missing
//! or non-finite coordinates) collapses into one [`GeoFailure`]. Callers gate on
//! "usable location or not" and never on the cause.

use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::access::distance::GeoPoint;

/// Upper bound on a single lookup. A slower provider counts as a failure.
pub const GEO_LOOKUP_TIMEOUT: Duration = Duration::from_secs(4);

/// Placeholder address used when no client address could be determined.
pub const UNKNOWN_ADDRESS: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoResolution {
    pub point: GeoPoint,
    pub country_code: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("geolocation unavailable: {reason}")]
pub struct GeoFailure {
    pub reason: String,
}

impl GeoFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Resolves a client address to an approximate location. Single attempt, no retries.
#[async_trait]
pub trait GeoResolver: Send + Sync {
    async fn resolve(&self, address: &str) -> Result<GeoResolution, GeoFailure>;
}

/// Raw provider body. Coordinates arrive as numbers or numeric strings
/// depending on the provider, so they are kept loose until validated.
#[derive(Debug, Default, Deserialize)]
struct LookupBody {
    #[serde(default)]
    latitude: Value,
    #[serde(default)]
    longitude: Value,
    country_code: Option<String>,
    city: Option<String>,
    region: Option<String>,
    #[serde(default)]
    error: bool,
    reason: Option<String>,
}

impl LookupBody {
    fn into_resolution(self) -> Result<GeoResolution, GeoFailure> {
        if self.error {
            return Err(GeoFailure::new(
                self.reason.unwrap_or_else(|| "provider error".to_string()),
            ));
        }
        let (Some(latitude), Some(longitude)) =
            (parse_coordinate(&self.latitude), parse_coordinate(&self.longitude))
        else {
            return Err(GeoFailure::new("missing or non-finite coordinates"));
        };

        Ok(GeoResolution {
            point: GeoPoint::new(latitude, longitude),
            country_code: non_blank(self.country_code).map(|c| c.to_uppercase()),
            city: non_blank(self.city),
            region: non_blank(self.region),
        })
    }
}

fn parse_coordinate(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// ipapi.co-compatible lookup: `GET {base_url}/{address}/json/`.
#[derive(Clone)]
pub struct IpApiResolver {
    client: Client,
    base_url: String,
}

impl IpApiResolver {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(GEO_LOOKUP_TIMEOUT)
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl GeoResolver for IpApiResolver {
    async fn resolve(&self, address: &str) -> Result<GeoResolution, GeoFailure> {
        let address = address.trim();
        if address.is_empty() || address == UNKNOWN_ADDRESS {
            return Err(GeoFailure::new("client address unknown"));
        }
        // Only a parsed IP is ever placed in the lookup path.
        let ip: IpAddr = address
            .parse()
            .map_err(|_| GeoFailure::new("client address is not an IP"))?;

        let url = format!("{}/{}/json/", self.base_url, ip);
        let response = self
            .client
            .get(&url)
            .header("accept", "application/json")
            .send()
            .await
            .map_err(|e| GeoFailure::new(format!("lookup request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeoFailure::new(format!("lookup returned {status}")));
        }

        let body: LookupBody = response
            .json()
            .await
            .map_err(|e| GeoFailure::new(format!("unreadable lookup body: {e}")))?;

        let resolution = body.into_resolution()?;
        debug!(
            "Resolved {address} to {:?}/{:?}",
            resolution.country_code, resolution.city
        );
        Ok(resolution)
    }
}
