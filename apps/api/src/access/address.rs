//! Client address extraction for gate identity keys.

use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};

use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts},
    http::{request::Parts, HeaderMap},
};

use crate::access::geo::UNKNOWN_ADDRESS;

/// Best-effort client address: first `X-Forwarded-For` hop, then `X-Real-IP`,
/// then the socket peer. A header value that is not an IP address yields
/// `"unknown"` rather than falling through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientAddress(pub String);

fn header_text<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

pub fn client_address(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let forwarded = header_text(headers, "x-forwarded-for")
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    match forwarded.or_else(|| header_text(headers, "x-real-ip")) {
        Some(hop) => hop
            .parse::<IpAddr>()
            .map(|ip| ip.to_string())
            .unwrap_or_else(|_| UNKNOWN_ADDRESS.to_string()),
        None => peer
            .map(|p| p.ip().to_string())
            .unwrap_or_else(|| UNKNOWN_ADDRESS.to_string()),
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for ClientAddress
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        Ok(ClientAddress(client_address(&parts.headers, peer)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn peer() -> Option<SocketAddr> {
        Some("10.0.0.7:55123".parse().unwrap())
    }

    #[test]
    fn test_first_forwarded_hop_wins() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static(" 203.0.113.9 , 10.0.0.1"),
        );
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.2"));
        assert_eq!(client_address(&headers, peer()), "203.0.113.9");
    }

    #[test]
    fn test_real_ip_used_without_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.2"));
        assert_eq!(client_address(&headers, peer()), "198.51.100.2");
    }

    #[test]
    fn test_peer_used_without_headers() {
        assert_eq!(client_address(&HeaderMap::new(), peer()), "10.0.0.7");
    }

    #[test]
    fn test_unknown_when_nothing_available() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static(""));
        assert_eq!(client_address(&headers, None), "unknown");
    }

    #[test]
    fn test_forwarded_hop_that_is_not_an_ip_is_unknown() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("../../admin?x=1, 10.0.0.1"),
        );
        assert_eq!(client_address(&headers, peer()), "unknown");
    }

    #[test]
    fn test_real_ip_that_is_not_an_ip_is_unknown() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("evil.example/path"));
        assert_eq!(client_address(&headers, peer()), "unknown");
    }

    #[test]
    fn test_ipv6_hop_is_normalized() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("2001:DB8::1"));
        assert_eq!(client_address(&headers, peer()), "2001:db8::1");
    }
}
