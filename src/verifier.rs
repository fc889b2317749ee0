// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Shared access key verification.
//!
//! The configured key is compared against submissions in constant time once
//! lengths match. Key length is not treated as secret.

use std::fmt;
use subtle::ConstantTimeEq;

/// Verifies submitted keys against the single configured secret.
#[derive(Clone)]
pub struct KeyVerifier {
    secret: Box<[u8]>,
}

impl KeyVerifier {
    /// Create a verifier. An empty secret disables verification entirely.
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into().into_boxed_slice(),
        }
    }

    /// Whether a secret is configured.
    pub fn is_enabled(&self) -> bool {
        !self.secret.is_empty()
    }

    /// Check a submitted key.
    ///
    /// Returns `false` when no secret is configured, the submission is empty,
    /// or the lengths differ. Equal-length inputs are compared without
    /// short-circuiting on the first differing byte.
    pub fn verify(&self, submitted: &str) -> bool {
        if !self.is_enabled() || submitted.is_empty() {
            return false;
        }

        let submitted = submitted.as_bytes();
        if submitted.len() != self.secret.len() {
            return false;
        }

        bool::from(submitted.ct_eq(&self.secret))
    }
}

impl fmt::Debug for KeyVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyVerifier")
            .field("enabled", &self.is_enabled())
            .finish_non_exhaustive()
    }
}
