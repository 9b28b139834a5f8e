use std::str::FromStr;

use anyhow::{Context, Result};

use crate::access::distance::GeoPoint;

const DEFAULT_GEO_LOOKUP_URL: &str = "https://ipapi.co";
const DEFAULT_CONCIERGE_CENTER: GeoPoint = GeoPoint::new(34.14352, -84.29926);
const DEFAULT_CONCIERGE_RADIUS_MILES: f64 = 20.0;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    /// Aging previews are disabled when unset.
    pub openai_api_key: Option<String>,
    pub email_api_key: String,
    pub email_from: String,
    pub clinic_inbox: String,
    pub provider_inbox: String,
    pub geo_lookup_url: String,
    /// ISO country codes allowed to submit a skin analysis.
    pub allowed_countries: Vec<String>,
    pub concierge_center: GeoPoint,
    pub concierge_radius_miles: f64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let allowed_countries = parse_country_list(
            &std::env::var("ALLOWED_COUNTRIES").unwrap_or_else(|_| "US".to_string()),
        );
        if allowed_countries.is_empty() {
            anyhow::bail!("ALLOWED_COUNTRIES must list at least one country code");
        }

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            openai_api_key: optional_env("OPENAI_API_KEY"),
            email_api_key: require_env("EMAIL_API_KEY")?,
            email_from: require_env("EMAIL_FROM")?,
            clinic_inbox: require_env("CLINIC_INBOX")?,
            provider_inbox: require_env("PROVIDER_INBOX")?,
            geo_lookup_url: optional_env("GEO_LOOKUP_URL")
                .unwrap_or_else(|| DEFAULT_GEO_LOOKUP_URL.to_string()),
            allowed_countries,
            concierge_center: GeoPoint::new(
                parse_env_or("CONCIERGE_CENTER_LAT", DEFAULT_CONCIERGE_CENTER.latitude)?,
                parse_env_or("CONCIERGE_CENTER_LON", DEFAULT_CONCIERGE_CENTER.longitude)?,
            ),
            concierge_radius_miles: parse_env_or(
                "CONCIERGE_RADIUS_MILES",
                DEFAULT_CONCIERGE_RADIUS_MILES,
            )?,
            port: parse_env_or("PORT", 8080u16)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        None => Ok(default),
    }
}

/// Comma-separated ISO codes → upper-cased, de-blanked list.
pub fn parse_country_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|c| c.trim().to_uppercase())
        .filter(|c| !c.is_empty())
        .collect()
}
