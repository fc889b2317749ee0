// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Test harness for driving the preview gate router in-process.
//!
//! Requests go through the full router with `tower::ServiceExt::oneshot`,
//! so routing, handlers and response headers are all exercised.

#![allow(dead_code)]

pub mod attacks;
pub mod generators;

use axum::{
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use preview_gate::{build_router, AppState, Config};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

/// Key used by most tests.
pub const TEST_KEY: &str = "abc123";

/// A response with its body decoded.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body is JSON")
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Config with the test key set and everything else default.
pub fn config() -> Config {
    let mut config = Config::default();
    config.preview.access_key = TEST_KEY.to_string();
    config
}

/// Shared state plus router built from `config`.
pub fn app_with(config: Config) -> (Arc<AppState>, Router) {
    let state = Arc::new(AppState::new(config).expect("metrics registry"));
    let router = build_router(state.clone());
    (state, router)
}

pub fn app() -> (Arc<AppState>, Router) {
    app_with(config())
}

/// POST a raw body to `path` as `client`.
pub fn post(path: &str, body: impl Into<Body>, client: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(path)
        .header("content-type", "application/json")
        .header("x-forwarded-for", client)
        .body(body.into())
        .expect("valid request")
}

/// POST `{"key": key}` to `path` as `client`.
pub fn post_key(path: &str, key: &str, client: &str) -> Request<Body> {
    post(path, serde_json::json!({ "key": key }).to_string(), client)
}

pub fn get(path: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(path)
        .body(Body::empty())
        .expect("valid request")
}

/// Send one request through the router and collect the response.
pub async fn send(router: &Router, request: Request<Body>) -> TestResponse {
    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("router is infallible");

    let status = response.status();
    let headers = response.headers().clone();
    let body = response
        .into_body()
        .collect()
        .await
        .expect("body collects")
        .to_bytes()
        .to_vec();

    TestResponse {
        status,
        headers,
        body,
    }
}
