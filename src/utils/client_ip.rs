//! Client identifier extraction for rate limiting.

use axum::http::HeaderMap;
use std::net::SocketAddr;

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_REAL_IP: &str = "x-real-ip";

/// Returns the identifier used to key a client's rate-limit window.
///
/// With `behind_proxy`, the first address in `X-Forwarded-For` (or `X-Real-IP`) is
/// trusted; otherwise only the socket peer address is used, since the headers are
/// client-controlled. Falls back to `"unknown"` when nothing is available.
///
/// # Examples
///
/// ```ignore
/// let mut headers = HeaderMap::new();
/// headers.insert("x-forwarded-for", "203.0.113.7, 10.0.0.1".parse().unwrap());
///
/// assert_eq!(client_id(&headers, None, true), "203.0.113.7");
/// ```
pub fn client_id(headers: &HeaderMap, peer: Option<SocketAddr>, behind_proxy: bool) -> String {
    if behind_proxy && let Some(ip) = forwarded_ip(headers) {
        return ip;
    }

    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn forwarded_ip(headers: &HeaderMap) -> Option<String> {
    let from_forwarded = headers
        .get(X_FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let from_real_ip = || {
        headers
            .get(X_REAL_IP)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    from_forwarded.or_else(from_real_ip).map(str::to_string)
}
