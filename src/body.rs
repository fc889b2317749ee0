// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Bounded JSON body reading.
//!
//! Bodies are accumulated frame by frame and the read is abandoned as soon
//! as the running total passes the limit. Decoding is lenient: an empty or
//! malformed body yields an empty object, so a missing key and a garbled
//! request are treated alike by the handlers.

use axum::body::Body;
use http_body_util::BodyExt;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

/// Body read failures.
#[derive(Debug, Error)]
pub enum BodyError {
    #[error("request body exceeds {limit} bytes")]
    TooLarge { limit: usize },

    #[error("failed to read request body: {0}")]
    Read(String),
}

/// Read a request body of at most `limit` bytes and decode it as JSON.
///
/// Dropping the body on [`BodyError::TooLarge`] stops the transfer; the
/// remainder is never buffered.
pub async fn read_json(mut body: Body, limit: usize) -> Result<Value, BodyError> {
    let mut size = 0usize;
    let mut data = Vec::new();

    while let Some(frame) = body.frame().await {
        let frame = frame.map_err(|e| BodyError::Read(e.to_string()))?;
        let Ok(chunk) = frame.into_data() else {
            // trailers
            continue;
        };

        size = size.saturating_add(chunk.len());
        if size > limit {
            warn!(limit, received = size, "Request body too large, aborting read");
            return Err(BodyError::TooLarge { limit });
        }
        data.extend_from_slice(&chunk);
    }

    Ok(decode_lenient(&data))
}

/// Decode JSON, mapping empty or malformed input to an empty object.
pub fn decode_lenient(data: &[u8]) -> Value {
    if data.iter().all(u8::is_ascii_whitespace) {
        return Value::Object(Map::new());
    }

    match serde_json::from_slice(data) {
        Ok(value) => value,
        Err(e) => {
            debug!(error = %e, "Malformed JSON body, treating as empty object");
            Value::Object(Map::new())
        }
    }
}
