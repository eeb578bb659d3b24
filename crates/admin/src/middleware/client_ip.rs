//! Client address resolution behind Cloudflare and Fly.io proxies.

use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::HeaderMap;
use axum::http::request::Parts;

use crate::models::activity_log::UNKNOWN_IP;

/// Real client IP from proxy headers.
///
/// Checks `CF-Connecting-IP`, the first `X-Forwarded-For` hop, `X-Real-IP`,
/// then `Fly-Client-IP`.
#[must_use]
pub fn from_headers(headers: &HeaderMap) -> Option<IpAddr> {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

    header("cf-connecting-ip")
        .and_then(|s| s.trim().parse().ok())
        .or_else(|| {
            header("x-forwarded-for")
                .and_then(|s| s.split(',').next())
                .and_then(|s| s.trim().parse().ok())
        })
        .or_else(|| header("x-real-ip").and_then(|s| s.trim().parse().ok()))
        .or_else(|| header("fly-client-ip").and_then(|s| s.trim().parse().ok()))
}

/// Proxy headers first, then the socket peer.
#[must_use]
pub fn resolve(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<IpAddr> {
    from_headers(headers).or_else(|| peer.map(|addr| addr.ip()))
}

/// Client address for the audit trail; `"unknown"` when nothing resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub String);

impl ClientIp {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        Ok(Self(resolve(&parts.headers, peer).map_or_else(
            || UNKNOWN_IP.to_owned(),
            |ip| ip.to_string(),
        )))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_header_precedence() {
        let all = headers(&[
            ("x-forwarded-for", "203.0.113.9, 10.0.0.1"),
            ("cf-connecting-ip", "198.51.100.7"),
            ("x-real-ip", "192.0.2.1"),
        ]);
        assert_eq!(from_headers(&all), Some("198.51.100.7".parse().unwrap()));

        let forwarded = headers(&[("x-forwarded-for", " 203.0.113.9 , 10.0.0.1")]);
        assert_eq!(
            from_headers(&forwarded),
            Some("203.0.113.9".parse().unwrap())
        );

        let fly = headers(&[("fly-client-ip", "2001:db8::1")]);
        assert_eq!(from_headers(&fly), Some("2001:db8::1".parse().unwrap()));
    }

    #[test]
    fn test_garbage_headers_fall_through_to_peer() {
        let bad = headers(&[("cf-connecting-ip", "not-an-ip")]);
        let peer: SocketAddr = "127.0.0.1:5555".parse().unwrap();
        assert_eq!(
            resolve(&bad, Some(peer)),
            Some("127.0.0.1".parse().unwrap())
        );
        assert_eq!(resolve(&bad, None), None);
    }
}
