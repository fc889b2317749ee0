// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Preview Gate
//!
//! Gates the site's private preview behind a shared access key:
//!
//! - `POST /api/preview/validate`: key check, returns the briefing on success
//! - `POST /api/preview/trace`: key check, returns the agent trace lines
//! - Constant-time key comparison
//! - 2 KiB streaming cap on request bodies
//! - Fixed-window per-client rate limiting (30 requests per 60 s default)
//!
//! Everything else is served from the built static site with SPA fallback.

pub mod app;
pub mod body;
pub mod briefing;
pub mod client_ip;
pub mod config;
pub mod error;
pub mod handlers;
pub mod limiter;
pub mod metrics;
pub mod static_files;
pub mod verifier;

pub use app::build_router;
pub use config::Config;
pub use handlers::AppState;
pub use limiter::{RateLimitResult, RateLimiter};
pub use verifier::KeyVerifier;
