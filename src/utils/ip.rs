use axum::http::{HeaderMap, StatusCode};
use std::net::{IpAddr, SocketAddr};

use crate::security::SecurityValidator;

/// Headers set by reverse proxies, in order of preference
const PROXY_HEADERS: [&str; 3] = ["x-forwarded-for", "x-real-ip", "cf-connecting-ip"];

/// Client address of a request.
///
/// With `trust_proxy_headers` the first parseable address from
/// X-Forwarded-For, X-Real-IP or CF-Connecting-IP is used; otherwise, or when
/// none parses, the TCP peer address.
pub fn extract_real_ip(
    headers: &HeaderMap,
    connect_info: &SocketAddr,
    trust_proxy_headers: bool,
) -> IpAddr {
    if trust_proxy_headers {
        for name in PROXY_HEADERS {
            let candidate = headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                // X-Forwarded-For is "client, proxy1, proxy2"
                .and_then(|value| value.split(',').next())
                .and_then(|first| first.trim().parse::<IpAddr>().ok());
            if let Some(ip) = candidate {
                return ip;
            }
        }
    }

    connect_info.ip()
}

/// Resolve the client address and check it against the allow-list.
/// Returns HTTP 403 when the address is not allowed.
pub fn validate_ip_access(
    security: &SecurityValidator,
    headers: &HeaderMap,
    connect_info: &SocketAddr,
) -> Result<IpAddr, StatusCode> {
    let real_ip = extract_real_ip(headers, connect_info, security.trust_proxy_headers());

    if security.validate_ip(&real_ip).is_err() {
        return Err(StatusCode::FORBIDDEN);
    }
    Ok(real_ip)
}
