// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Router assembly.

use crate::handlers::{health, metrics, preview, AppState, PREVIEW_PREFIX};
use crate::static_files;
use axum::{
    routing::{any, get},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Build the service router: health, metrics, preview API and static site.
pub fn build_router(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route(PREVIEW_PREFIX, any(preview))
        .route(&format!("{}*rest", PREVIEW_PREFIX), any(preview));

    if state.config.metrics.enabled {
        router = router.route(&state.config.metrics.path, get(metrics));
    }

    router
        .fallback(static_files::serve)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
