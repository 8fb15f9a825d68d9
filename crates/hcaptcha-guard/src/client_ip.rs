//! Caller address resolution for `remoteip`.
//!
//! Looks at the usual proxy headers first, then falls back to the socket
//! peer address recorded by `into_make_service_with_connect_info`.
//!
//! The headers are taken as sent: a client talking to the service directly
//! can put any address in them. Only trust [`ClientIp::from_request`] behind
//! a proxy that overwrites them, otherwise use [`ClientIp::from_peer`].

use std::net::{IpAddr, SocketAddr};

use axum::{extract::ConnectInfo, http::Request};

/// Header priority for IP extraction (highest to lowest).
const IP_HEADERS: &[&str] = &[
    "cf-connecting-ip", // Cloudflare
    "x-real-ip",        // Nginx
    "x-forwarded-for",  // first hop of the proxy chain
];

/// Client IP address resolved from a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientIp(pub Option<IpAddr>);

impl ClientIp {
    /// Proxy headers first, then the socket peer
    #[must_use]
    pub fn from_request<T>(req: &Request<T>) -> Self {
        Self(from_headers(req).or_else(|| peer(req)))
    }

    /// Socket peer only; proxy headers are ignored
    #[must_use]
    pub fn from_peer<T>(req: &Request<T>) -> Self {
        Self(peer(req))
    }

    #[inline]
    #[must_use]
    pub const fn ip(&self) -> Option<IpAddr> {
        self.0
    }
}

fn from_headers<T>(req: &Request<T>) -> Option<IpAddr> {
    IP_HEADERS.iter().find_map(|name| {
        req.headers()
            .get(*name)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .map(str::trim)
            .and_then(|s| s.parse::<IpAddr>().ok())
    })
}

fn peer<T>(req: &Request<T>) -> Option<IpAddr> {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip())
}
