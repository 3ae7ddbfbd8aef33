use axum::{
    extract::ConnectInfo,
    http::{request::Parts, HeaderMap},
};
use std::net::SocketAddr;

use crate::middleware::RequestContext;

pub const UNKNOWN_IP: &str = "unknown";
const FORWARDED_FOR: &str = "x-forwarded-for";

/// Resolves the client IP: socket peer address first, then the last
/// `X-Forwarded-For` hop, otherwise `"unknown"`.
pub fn resolve_ip(parts: &mut Parts) -> String {
    if let Some(ip) = RequestContext::cached_ip(&parts.extensions) {
        return ip;
    }

    let ip = remote_addr(parts)
        .or_else(|| last_forwarded_hop(&parts.headers))
        .unwrap_or_else(|| UNKNOWN_IP.to_string());

    RequestContext::of_mut(&mut parts.extensions).ip = Some(ip.clone());
    ip
}

fn remote_addr(parts: &Parts) -> Option<String> {
    parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
}

// Proxies append to the header, so the rightmost entry is the hop we trust.
fn last_forwarded_hop(headers: &HeaderMap) -> Option<String> {
    headers
        .get(FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .and_then(|xff| xff.rsplit(',').next())
        .map(str::trim)
        .filter(|hop| !hop.is_empty())
        .map(str::to_owned)
}
