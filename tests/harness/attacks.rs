// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Attack simulation patterns for security testing.

use super::{generators, post_key, send};
use axum::{http::StatusCode, Router};
use std::collections::HashMap;
use std::fmt;

/// Attack pattern configuration.
#[derive(Debug, Clone)]
pub struct AttackConfig {
    /// Total number of requests to send
    pub total_requests: usize,
    /// Number of distinct client identities to rotate through
    pub unique_clients: usize,
    /// Endpoint under attack
    pub path: &'static str,
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            total_requests: 100,
            unique_clients: 1,
            path: "/api/preview/validate",
        }
    }
}

/// Predefined attack patterns.
impl AttackConfig {
    /// Key guessing from one client.
    pub fn single_client_brute_force() -> Self {
        Self {
            total_requests: 200,
            unique_clients: 1,
            ..Default::default()
        }
    }

    /// Key guessing spread across many clients, a few requests each.
    pub fn distributed_brute_force() -> Self {
        Self {
            total_requests: 500,
            unique_clients: 100,
            path: "/api/preview/trace",
        }
    }
}

/// Outcome tally from an attack run.
#[derive(Debug, Default)]
pub struct AttackReport {
    pub by_status: HashMap<u16, usize>,
    pub accepted_keys: usize,
    pub total: usize,
}

impl AttackReport {
    pub fn count(&self, status: StatusCode) -> usize {
        self.by_status.get(&status.as_u16()).copied().unwrap_or(0)
    }

    pub fn block_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.count(StatusCode::TOO_MANY_REQUESTS) as f64 / self.total as f64
        }
    }
}

impl fmt::Display for AttackReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "total: {}", self.total)?;
        writeln!(f, "accepted keys: {}", self.accepted_keys)?;
        let mut statuses: Vec<_> = self.by_status.iter().collect();
        statuses.sort();
        for (status, count) in statuses {
            writeln!(f, "  {}: {}", status, count)?;
        }
        write!(f, "block rate: {:.2}", self.block_rate())
    }
}

/// Send wrong-key guesses through the router, rotating client identities.
pub async fn run_attack(router: &Router, config: &AttackConfig) -> AttackReport {
    let clients = generators::generate_clients(config.unique_clients);
    let mut report = AttackReport::default();

    for i in 0..config.total_requests {
        let client = &clients[i % clients.len()];
        let guess = format!("guess{}", i);
        let response = send(router, post_key(config.path, &guess, client)).await;

        *report.by_status.entry(response.status.as_u16()).or_insert(0) += 1;
        if response.status == StatusCode::OK && response.json()["ok"] == true {
            report.accepted_keys += 1;
        }
        report.total += 1;
    }

    report
}
