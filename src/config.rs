// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the preview gate service.
//!
//! Every value is optional. Environment variables override the defaults:
//!
//! - `HOST` / `PORT`: bind address (default: 0.0.0.0:4173)
//! - `PREVIEW_ACCESS_KEY`: shared secret; unset or empty disables the endpoints
//! - `PREVIEW_BRIEFING`: pipe-delimited briefing lines
//! - `PREVIEW_RATE_LIMIT_WINDOW_MS`: window length (default: 60000)
//! - `PREVIEW_RATE_LIMIT_MAX`: requests per window per client (default: 30)
//! - `PREVIEW_TRUST_FORWARDED_FOR`: derive client identity from `X-Forwarded-For` (default: true)
//! - `STATIC_DIR`: directory of built front-end assets (default: dist)
//! - `METRICS_ENABLED`: expose `/metrics` (default: true)

use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Largest request body accepted by the preview endpoints, in bytes.
pub const MAX_BODY_BYTES: usize = 2048;

/// Configuration for the preview gate service.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server bind address (default: 0.0.0.0:4173)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Preview key and briefing
    #[serde(default)]
    pub preview: PreviewConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Client identity derivation
    #[serde(default)]
    pub client_ip: ClientIpConfig,

    /// Static asset serving
    #[serde(default)]
    pub static_files: StaticConfig,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Preview access configuration.
#[derive(Clone, Default, Deserialize)]
pub struct PreviewConfig {
    /// Shared access key. Empty disables both preview endpoints.
    #[serde(default)]
    pub access_key: String,

    /// Raw pipe-delimited briefing override
    #[serde(default)]
    pub briefing: Option<String>,
}

impl fmt::Debug for PreviewConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreviewConfig")
            .field("access_key", &if self.access_key.is_empty() { "<unset>" } else { "<redacted>" })
            .field("briefing", &self.briefing)
            .finish()
    }
}

/// Fixed-window rate limiting configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Window length in milliseconds (default: 60000)
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,

    /// Maximum requests per client per window (default: 30)
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    /// Tracked-client count above which expired entries are pruned (default: 2048)
    #[serde(default = "default_prune_threshold")]
    pub prune_threshold: usize,
}

/// Client identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientIpConfig {
    /// Trust the first `X-Forwarded-For` entry (default: true).
    ///
    /// Only safe behind a reverse proxy that overwrites the header.
    #[serde(default = "default_true")]
    pub trust_forwarded_for: bool,
}

/// Static asset configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StaticConfig {
    /// Directory holding the built site (default: dist)
    #[serde(default = "default_static_dir")]
    pub dir: PathBuf,
}

/// Metrics configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    /// Enable Prometheus metrics endpoint (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Metrics endpoint path (default: /metrics)
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

// Default value functions
fn default_bind_addr() -> String {
    "0.0.0.0:4173".to_string()
}

fn default_window_ms() -> u64 {
    60_000
}

fn default_max_requests() -> u32 {
    30
}

fn default_prune_threshold() -> usize {
    2048
}

fn default_true() -> bool {
    true
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("dist")
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            preview: PreviewConfig::default(),
            rate_limit: RateLimitConfig::default(),
            client_ip: ClientIpConfig::default(),
            static_files: StaticConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_ms: default_window_ms(),
            max_requests: default_max_requests(),
            prune_threshold: default_prune_threshold(),
        }
    }
}

impl Default for ClientIpConfig {
    fn default() -> Self {
        Self {
            trust_forwarded_for: default_true(),
        }
    }
}

impl Default for StaticConfig {
    fn default() -> Self {
        Self {
            dir: default_static_dir(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            path: default_metrics_path(),
        }
    }
}

impl RateLimitConfig {
    /// Get the rate window duration
    pub fn window_duration(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let host = lookup("HOST").filter(|h| !h.trim().is_empty());
        let port = parsed(&lookup, "PORT").unwrap_or(4173u16);
        let bind_addr = match host {
            Some(host) => format!("{}:{}", host.trim(), port),
            None => format!("0.0.0.0:{}", port),
        };

        Self {
            bind_addr,
            preview: PreviewConfig {
                access_key: lookup("PREVIEW_ACCESS_KEY").unwrap_or_default(),
                briefing: lookup("PREVIEW_BRIEFING").filter(|b| !b.is_empty()),
            },
            rate_limit: RateLimitConfig {
                window_ms: parsed(&lookup, "PREVIEW_RATE_LIMIT_WINDOW_MS")
                    .unwrap_or(defaults.rate_limit.window_ms),
                max_requests: parsed(&lookup, "PREVIEW_RATE_LIMIT_MAX")
                    .unwrap_or(defaults.rate_limit.max_requests),
                ..defaults.rate_limit
            },
            client_ip: ClientIpConfig {
                trust_forwarded_for: flag(&lookup, "PREVIEW_TRUST_FORWARDED_FOR")
                    .unwrap_or(defaults.client_ip.trust_forwarded_for),
            },
            static_files: StaticConfig {
                dir: lookup("STATIC_DIR")
                    .filter(|d| !d.trim().is_empty())
                    .map(PathBuf::from)
                    .unwrap_or(defaults.static_files.dir),
            },
            metrics: MetricsConfig {
                enabled: flag(&lookup, "METRICS_ENABLED").unwrap_or(defaults.metrics.enabled),
                ..defaults.metrics
            },
        }
    }
}

fn parsed<F, T>(lookup: &F, name: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(name).and_then(|v| v.trim().parse().ok())
}

fn flag<F>(lookup: &F, name: &str) -> Option<bool>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name)?.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = Config::from_lookup(|_| None);

        assert_eq!(config.bind_addr, "0.0.0.0:4173");
        assert!(config.preview.access_key.is_empty());
        assert!(config.preview.briefing.is_none());
        assert_eq!(config.rate_limit.window_ms, 60_000);
        assert_eq!(config.rate_limit.max_requests, 30);
        assert_eq!(config.rate_limit.prune_threshold, 2048);
        assert!(config.client_ip.trust_forwarded_for);
        assert_eq!(config.static_files.dir, PathBuf::from("dist"));
        assert!(config.metrics.enabled);
    }

    #[test]
    fn test_environment_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "8088"),
            ("PREVIEW_ACCESS_KEY", "abc123"),
            ("PREVIEW_BRIEFING", "one|two"),
            ("PREVIEW_RATE_LIMIT_WINDOW_MS", "1000"),
            ("PREVIEW_RATE_LIMIT_MAX", "5"),
            ("PREVIEW_TRUST_FORWARDED_FOR", "false"),
            ("STATIC_DIR", "public"),
            ("METRICS_ENABLED", "0"),
        ]));

        assert_eq!(config.bind_addr, "127.0.0.1:8088");
        assert_eq!(config.preview.access_key, "abc123");
        assert_eq!(config.preview.briefing.as_deref(), Some("one|two"));
        assert_eq!(config.rate_limit.window_duration(), Duration::from_secs(1));
        assert_eq!(config.rate_limit.max_requests, 5);
        assert!(!config.client_ip.trust_forwarded_for);
        assert_eq!(config.static_files.dir, PathBuf::from("public"));
        assert!(!config.metrics.enabled);
    }

    #[test]
    fn test_unparseable_values_fall_back() {
        let config = Config::from_lookup(lookup_from(&[
            ("PORT", "eighty"),
            ("PREVIEW_RATE_LIMIT_MAX", "-3"),
            ("PREVIEW_TRUST_FORWARDED_FOR", "maybe"),
        ]));

        assert_eq!(config.bind_addr, "0.0.0.0:4173");
        assert_eq!(config.rate_limit.max_requests, 30);
        assert!(config.client_ip.trust_forwarded_for);
    }

    #[test]
    fn test_deserialize_partial_document() {
        let config: Config = serde_json::from_value(serde_json::json!({
            "rate_limit": { "max_requests": 3 },
            "preview": { "access_key": "s3cret" }
        }))
        .unwrap();

        assert_eq!(config.rate_limit.max_requests, 3);
        assert_eq!(config.rate_limit.window_ms, 60_000);
        assert_eq!(config.preview.access_key, "s3cret");
        assert_eq!(config.metrics.path, "/metrics");
    }

    #[test]
    fn test_debug_redacts_access_key() {
        let config = Config::from_lookup(lookup_from(&[("PREVIEW_ACCESS_KEY", "hunter2")]));
        let rendered = format!("{:?}", config);

        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }
}
