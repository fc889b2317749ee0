// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Static site serving with single-page-app fallback.
//!
//! Paths that name a file (have an extension) must exist or return 404.
//! Extensionless paths that do not exist fall back to `index.html` so the
//! client-side router can handle them.

use crate::handlers::AppState;
use axum::{
    body::Body,
    extract::{Request, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};
use std::path::Path;
use std::sync::Arc;
use tower::ServiceExt;
use tower_http::services::{ServeDir, ServeFile};
use tracing::debug;

/// Fallback handler for every non-API route.
pub async fn serve(State(state): State<Arc<AppState>>, request: Request) -> Response {
    if !matches!(*request.method(), Method::GET | Method::HEAD) {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }

    let dir = &state.config.static_files.dir;
    let looks_like_file = Path::new(request.uri().path()).extension().is_some();

    let mut index_request = Request::new(Body::empty());
    *index_request.method_mut() = request.method().clone();
    *index_request.headers_mut() = request.headers().clone();

    let response = match ServeDir::new(dir).oneshot(request).await {
        Ok(response) => response,
        Err(never) => match never {},
    };

    if response.status() != StatusCode::NOT_FOUND || looks_like_file {
        return response.map(Body::new).into_response();
    }

    debug!("No static file matched, serving index.html");
    match ServeFile::new(dir.join("index.html")).oneshot(index_request).await {
        Ok(response) => response.map(Body::new).into_response(),
        Err(never) => match never {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_detection() {
        assert!(Path::new("/assets/app.js").extension().is_some());
        assert!(Path::new("/favicon.ico").extension().is_some());
        assert!(Path::new("/blog/post").extension().is_none());
        assert!(Path::new("/").extension().is_none());
    }
}
