// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Preview request rejections.
//!
//! A wrong key is not an error: it is reported as `ok: false` in a 200.

use crate::body::BodyError;
use axum::http::StatusCode;
use std::time::Duration;
use thiserror::Error;

/// Reasons a preview request is rejected before key verification.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PreviewError {
    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("rate limit exceeded, retry in {retry_after:?}")]
    RateLimited { retry_after: Duration },

    #[error("preview access is not configured")]
    Unavailable,

    #[error("request body too large")]
    PayloadTooLarge,

    #[error("malformed request")]
    MalformedRequest,
}

impl PreviewError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::MalformedRequest => StatusCode::BAD_REQUEST,
        }
    }

    /// Metric label for this rejection.
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::MethodNotAllowed => "method_not_allowed",
            Self::RateLimited { .. } => "rate_limited",
            Self::Unavailable => "unavailable",
            Self::PayloadTooLarge => "payload_too_large",
            Self::MalformedRequest => "malformed",
        }
    }

    /// `Retry-After` value in whole seconds, rounded up, at least 1.
    pub fn retry_after_secs(&self) -> Option<u64> {
        match self {
            Self::RateLimited { retry_after } => {
                let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
                Some(secs.max(1))
            }
            _ => None,
        }
    }
}

impl From<BodyError> for PreviewError {
    fn from(err: BodyError) -> Self {
        match err {
            BodyError::TooLarge { .. } => Self::PayloadTooLarge,
            BodyError::Read(_) => Self::MalformedRequest,
        }
    }
}
