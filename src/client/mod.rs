//! Client identity resolution
//!
//! Works out which address a request came from, looking through reverse
//! proxy headers first, and classifies addresses that cannot be geolocated.

use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};

/// Proxy header carrying a comma-separated list of hop addresses
pub const FORWARDED_FOR: &str = "x-forwarded-for";

/// Single-address header set by nginx and similar proxies
pub const REAL_IP: &str = "x-real-ip";

/// Address used when neither headers nor the transport yield one
const UNKNOWN_CLIENT: &str = "127.0.0.1";

/// The requester's address, as resolved for this request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientIdentity {
    pub ip_address: String,
    pub is_private: bool,
}

impl ClientIdentity {
    /// Classify an already-known address
    pub fn new(ip_address: impl Into<String>) -> Self {
        let ip_address = ip_address.into();
        let is_private = is_private(&ip_address);
        Self {
            ip_address,
            is_private,
        }
    }

    /// Resolve the identity from request headers and the peer address
    pub fn from_request(headers: &HeaderMap, peer: Option<SocketAddr>) -> Self {
        Self::new(resolve_client_ip(headers, peer))
    }
}

/// What to do when the client address is private or loopback
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrivateIpPolicy {
    /// Skip geolocation and show the default location
    #[default]
    SkipLookup,
    /// Refuse the request with a 400
    Reject,
}

impl std::fmt::Display for PrivateIpPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SkipLookup => write!(f, "skip_lookup"),
            Self::Reject => write!(f, "reject"),
        }
    }
}

impl std::str::FromStr for PrivateIpPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "skip_lookup" | "skip-lookup" | "skip" => Ok(Self::SkipLookup),
            "reject" => Ok(Self::Reject),
            _ => Err(format!("Unknown private IP policy: {}", s)),
        }
    }
}

/// Extract the client IP address from headers and the peer address
///
/// Checks, in order:
/// 1. X-Forwarded-For (leftmost entry is the original client)
/// 2. X-Real-IP
/// 3. The transport peer address
///
/// Header values of the form `ip:port` or `[v6]:port` lose the port.
/// Never returns an empty string.
pub fn resolve_client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let forwarded = header_value(headers, FORWARDED_FOR)
        .and_then(|value| value.split(',').next().map(str::trim))
        .filter(|first| !first.is_empty());
    if let Some(hop) = forwarded {
        return strip_port(hop);
    }

    if let Some(ip) = header_value(headers, REAL_IP).map(str::trim).filter(|v| !v.is_empty()) {
        return strip_port(ip);
    }

    match peer {
        Some(addr) => addr.ip().to_string(),
        None => UNKNOWN_CLIENT.to_string(),
    }
}

/// Drop a port suffix from a header address, leaving anything else as is
fn strip_port(hop: &str) -> String {
    if hop.parse::<IpAddr>().is_ok() {
        return hop.to_string();
    }
    match hop.parse::<SocketAddr>() {
        Ok(addr) => addr.ip().to_string(),
        Err(_) => hop.to_string(),
    }
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// Whether an address cannot be meaningfully geolocated
///
/// True for RFC1918, loopback, link-local, unspecified and IPv6
/// unique-local addresses, and for anything that is not an IP address.
pub fn is_private(ip: &str) -> bool {
    match ip.trim().parse::<IpAddr>() {
        Ok(IpAddr::V4(v4)) => {
            v4.is_private() || v4.is_loopback() || v4.is_link_local() || v4.is_unspecified()
        }
        Ok(IpAddr::V6(v6)) => {
            if let Some(v4) = v6.to_ipv4_mapped() {
                return is_private(&v4.to_string());
            }
            let first = v6.segments()[0];
            v6.is_loopback()
                || v6.is_unspecified()
                // fc00::/7 unique local
                || (first & 0xfe00) == 0xfc00
                // fe80::/10 link local
                || (first & 0xffc0) == 0xfe80
        }
        Err(_) => true,
    }
}
