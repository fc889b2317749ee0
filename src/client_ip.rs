// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Client identity for rate limiting.
//!
//! # Trust model
//!
//! `X-Forwarded-For` is client-controlled unless a reverse proxy in front of
//! this service overwrites it. With `trust_forwarded_for` enabled the first
//! entry is authoritative, so a direct client can pick its own identity and
//! sidestep the limiter. Disable trust when the service is exposed directly.

use axum::http::HeaderMap;
use std::net::SocketAddr;
use tracing::debug;

/// Header carrying the proxy-reported client address chain.
pub const FORWARDED_FOR: &str = "x-forwarded-for";

/// Identity used when neither header nor peer address is available.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Derive the rate limiting identity for a request.
pub fn client_identity(
    headers: &HeaderMap,
    remote: Option<SocketAddr>,
    trust_forwarded_for: bool,
) -> String {
    if let Some(forwarded) = headers.get(FORWARDED_FOR) {
        if trust_forwarded_for {
            let first = forwarded
                .to_str()
                .ok()
                .and_then(|v| v.split(',').next())
                .map(str::trim)
                .unwrap_or("");
            if !first.is_empty() {
                return first.to_string();
            }
        } else {
            debug!(peer = ?remote, "Ignoring X-Forwarded-For from untrusted peer");
        }
    }

    remote
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}
