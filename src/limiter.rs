// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Fixed-window rate limiter for the preview endpoints.
//!
//! Each client identity gets a counter and a reset deadline. The first
//! request at or after the deadline starts a fresh window with a count of 1.
//! Expired entries are pruned opportunistically once the table grows past
//! the configured high-water mark, and by a periodic [`RateLimiter::cleanup`].

use crate::config::RateLimitConfig;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Result of a rate limit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitResult {
    /// Request is allowed
    Allowed {
        /// Remaining requests in current window
        remaining: u32,
        /// Time until window resets
        reset_in: Duration,
    },
    /// Request is rate limited
    Limited {
        /// Time until the window resets
        retry_after: Duration,
    },
}

impl RateLimitResult {
    pub fn is_limited(&self) -> bool {
        matches!(self, RateLimitResult::Limited { .. })
    }
}

/// Per-client window state.
#[derive(Debug)]
struct WindowEntry {
    count: u32,
    reset_at: Instant,
}

/// Shared fixed-window rate limiter.
///
/// The check-and-increment runs under one lock acquisition, so concurrent
/// requests from the same client never lose updates.
pub struct RateLimiter {
    config: RateLimitConfig,
    entries: Mutex<HashMap<String, WindowEntry>>,
}

impl RateLimiter {
    /// Create a new rate limiter with the given configuration.
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Record a request from `client` and report whether it is allowed.
    pub async fn check(&self, client: &str) -> RateLimitResult {
        let now = Instant::now();
        let window = self.config.window_duration();
        let max = self.config.max_requests;

        let mut entries = self.entries.lock().await;

        let live = entries.get_mut(client).filter(|entry| now < entry.reset_at);
        let result = match live {
            Some(entry) => {
                entry.count = entry.count.saturating_add(1);
                let reset_in = entry.reset_at.duration_since(now);
                if entry.count > max {
                    debug!(client, count = entry.count, ?reset_in, "Client over limit");
                    RateLimitResult::Limited {
                        retry_after: reset_in,
                    }
                } else {
                    RateLimitResult::Allowed {
                        remaining: max - entry.count,
                        reset_in,
                    }
                }
            }
            None => {
                entries.insert(
                    client.to_string(),
                    WindowEntry {
                        count: 1,
                        reset_at: now + window,
                    },
                );
                RateLimitResult::Allowed {
                    remaining: max.saturating_sub(1),
                    reset_in: window,
                }
            }
        };

        if entries.len() > self.config.prune_threshold {
            let before = entries.len();
            entries.retain(|_, entry| now < entry.reset_at);
            debug!(before, after = entries.len(), "Pruned expired rate limit entries");
        }

        result
    }

    /// Record a request from `client`; `true` when it must be rejected.
    pub async fn is_limited(&self, client: &str) -> bool {
        self.check(client).await.is_limited()
    }

    /// Remove every entry whose window has passed.
    pub async fn cleanup(&self) {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        entries.retain(|_, entry| now < entry.reset_at);
    }

    /// Number of clients currently tracked.
    pub async fn tracked_clients(&self) -> usize {
        self.entries.lock().await.len()
    }
}
