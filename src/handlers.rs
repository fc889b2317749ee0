// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the preview gate service.
//!
//! Both preview endpoints run the same pipeline and differ only in the
//! payload they return:
//!
//! ```text
//! method check (405) → rate limit (429) → key configured (503)
//!     → bounded body read (413 / 400) → key verification → 200 { ok, ... }
//! ```

use crate::body::read_json;
use crate::briefing::{outcome_to_trace, Briefing, TraceLine};
use crate::client_ip::client_identity;
use crate::config::{Config, MAX_BODY_BYTES};
use crate::error::PreviewError;
use crate::limiter::{RateLimitResult, RateLimiter};
use crate::metrics::Metrics;
use crate::verifier::KeyVerifier;
use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Path prefix reserved for the preview endpoints.
pub const PREVIEW_PREFIX: &str = "/api/preview/";

/// Paths under this prefix are answered by the trace endpoint.
pub const TRACE_PREFIX: &str = "/api/preview/trace";

/// Shared application state.
pub struct AppState {
    pub limiter: RateLimiter,
    pub verifier: KeyVerifier,
    pub briefing: Briefing,
    pub metrics: Metrics,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config) -> prometheus::Result<Self> {
        Ok(Self {
            limiter: RateLimiter::new(config.rate_limit.clone()),
            verifier: KeyVerifier::new(config.preview.access_key.as_str()),
            briefing: Briefing::from_override(config.preview.briefing.as_deref()),
            metrics: Metrics::new()?,
            config,
        })
    }
}

/// The two preview operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Validate,
    Trace,
}

impl Endpoint {
    pub fn name(self) -> &'static str {
        match self {
            Self::Validate => "validate",
            Self::Trace => "trace",
        }
    }
}

/// Body of a validate response.
#[derive(Debug, Serialize)]
pub struct ValidateResponse<'a> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub briefing: Option<&'a [String]>,
}

/// Body of a trace response.
#[derive(Debug, Serialize)]
pub struct TraceResponse {
    pub ok: bool,
    pub trace: &'static [TraceLine],
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Whether `path` belongs to the preview API.
pub fn is_preview_route(path: &str) -> bool {
    path.starts_with(PREVIEW_PREFIX)
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "preview-gate",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Prometheus metrics endpoint.
pub async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    state
        .metrics
        .set_tracked_clients(state.limiter.tracked_clients().await);

    match state.metrics.render() {
        Ok(text) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(e) => {
            warn!(error = %e, "Failed to render metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Route any preview path to its endpoint.
///
/// `/api/preview/trace*` reaches the trace endpoint; every other preview
/// path is treated as a validate request.
pub async fn preview(state: State<Arc<AppState>>, request: Request) -> Response {
    if request.uri().path().starts_with(TRACE_PREFIX) {
        trace(state, request).await
    } else {
        validate(state, request).await
    }
}

/// Check a preview key and reveal the briefing when it matches.
pub async fn validate(State(state): State<Arc<AppState>>, request: Request) -> Response {
    let endpoint = Endpoint::Validate;
    match authorize(&state, endpoint, request).await {
        Ok(ok) => {
            state.metrics.record(endpoint.name(), outcome_label(ok));
            json_response(
                StatusCode::OK,
                ValidateResponse {
                    ok,
                    briefing: ok.then(|| state.briefing.lines()),
                },
            )
        }
        Err(err) => reject(
            &state,
            endpoint,
            err,
            ValidateResponse {
                ok: false,
                briefing: None,
            },
        ),
    }
}

/// Check a preview key and return the agent trace for the outcome.
pub async fn trace(State(state): State<Arc<AppState>>, request: Request) -> Response {
    let endpoint = Endpoint::Trace;
    match authorize(&state, endpoint, request).await {
        Ok(ok) => {
            state.metrics.record(endpoint.name(), outcome_label(ok));
            json_response(
                StatusCode::OK,
                TraceResponse {
                    ok,
                    trace: outcome_to_trace(ok),
                },
            )
        }
        Err(err) => reject(
            &state,
            endpoint,
            err,
            TraceResponse {
                ok: false,
                trace: &[],
            },
        ),
    }
}

/// Run the shared pipeline and return whether the submitted key matched.
///
/// The rate limit is charged before the body is read, so a client that
/// disconnects mid-body still counts exactly once.
async fn authorize(
    state: &AppState,
    endpoint: Endpoint,
    request: Request,
) -> Result<bool, PreviewError> {
    let (parts, body) = request.into_parts();

    if parts.method != Method::POST {
        debug!(endpoint = endpoint.name(), method = %parts.method, "Rejecting non-POST preview request");
        return Err(PreviewError::MethodNotAllowed);
    }

    let remote = parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let client = client_identity(
        &parts.headers,
        remote,
        state.config.client_ip.trust_forwarded_for,
    );

    if let RateLimitResult::Limited { retry_after } = state.limiter.check(&client).await {
        warn!(
            endpoint = endpoint.name(),
            client = %client,
            retry_after_secs = retry_after.as_secs(),
            "Preview request rate limited"
        );
        return Err(PreviewError::RateLimited { retry_after });
    }

    if !state.verifier.is_enabled() {
        debug!(endpoint = endpoint.name(), "Preview access key not configured");
        return Err(PreviewError::Unavailable);
    }

    let payload = read_json(body, MAX_BODY_BYTES).await?;
    let ok = state.verifier.verify(&submitted_key(&payload));

    info!(endpoint = endpoint.name(), client = %client, ok, "Preview key checked");
    Ok(ok)
}

/// Extract the `key` field as text.
///
/// Numbers and booleans are accepted in their textual form. Anything else,
/// including a non-object body, counts as no key.
fn submitted_key(payload: &Value) -> String {
    match payload.get("key") {
        Some(Value::String(key)) => key.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn outcome_label(ok: bool) -> &'static str {
    if ok {
        "ok"
    } else {
        "invalid_key"
    }
}

fn reject<T: Serialize>(state: &AppState, endpoint: Endpoint, err: PreviewError, body: T) -> Response {
    state.metrics.record(endpoint.name(), err.outcome());

    let mut response = json_response(err.status_code(), body);
    let headers = response.headers_mut();
    match err {
        PreviewError::MethodNotAllowed => {
            headers.insert(header::ALLOW, HeaderValue::from_static("POST"));
        }
        PreviewError::RateLimited { .. } => {
            if let Some(secs) = err.retry_after_secs() {
                headers.insert(header::RETRY_AFTER, HeaderValue::from(secs));
            }
        }
        _ => {}
    }
    response
}

/// JSON response with caching disabled and framing/sniffing locked down.
fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [
            (header::CACHE_CONTROL, "no-store"),
            (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
            (header::X_FRAME_OPTIONS, "DENY"),
            (header::REFERRER_POLICY, "no-referrer"),
        ],
        Json(body),
    )
        .into_response()
}
