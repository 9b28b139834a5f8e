//! Country-level screen used by the skin-analysis submission.
//!
//! Lighter than the radius geofence: only the resolved country code matters.
//! A failed lookup or a missing country code denies, same as the geofence.

use tracing::warn;

use crate::access::gate::{AccessDecision, ReasonCode};
use crate::access::geo::GeoResolver;

/// Returns the matched country code, or the denial decision.
pub async fn screen_country(
    resolver: &dyn GeoResolver,
    address: &str,
    allowed_countries: &[String],
) -> Result<String, AccessDecision> {
    let resolution = resolver.resolve(address).await.map_err(|failure| {
        warn!(%address, "Country lookup failed, denying: {failure}");
        AccessDecision::deny(ReasonCode::GeoUnavailable)
    })?;

    let Some(country) = resolution.country_code else {
        warn!(%address, "Country lookup returned no country code, denying");
        return Err(AccessDecision::deny(ReasonCode::GeoUnavailable));
    };

    if !allowed_countries
        .iter()
        .any(|c| c.eq_ignore_ascii_case(&country))
    {
        warn!(%address, %country, "Submission from unsupported country");
        return Err(AccessDecision::deny(ReasonCode::OutsideServiceArea));
    }

    Ok(country)
}
