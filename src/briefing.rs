// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Payloads revealed by the preview endpoints.
//!
//! The briefing is shown after a successful key check. The agent trace is
//! flavor text for the front end's terminal animation; it encodes nothing
//! beyond whether the key was accepted.

use serde::Serialize;

/// Lines returned when no briefing override is configured.
pub const DEFAULT_BRIEFING: [&str; 3] = [
    "Signal: NEOGNATHAE v0.3",
    "Window: 144K, Latency: <200ms",
    "Channel: Closed, Status: Live",
];

/// Briefing lines, fixed at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Briefing {
    lines: Vec<String>,
}

impl Briefing {
    /// Build from an optional pipe-delimited override.
    ///
    /// Segments are trimmed and empty ones dropped. An override with no
    /// remaining segments falls back to the default lines.
    pub fn from_override(raw: Option<&str>) -> Self {
        let lines: Vec<String> = raw
            .map(|raw| {
                raw.split('|')
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        if lines.is_empty() {
            Self::default()
        } else {
            Self { lines }
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

impl Default for Briefing {
    fn default() -> Self {
        Self {
            lines: DEFAULT_BRIEFING.iter().map(|l| l.to_string()).collect(),
        }
    }
}

/// Severity shown next to a trace line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TraceLevel {
    Info,
    Warn,
    Error,
}

/// One line of the agent trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceLine {
    pub text: &'static str,
    pub level: TraceLevel,
}

const fn line(text: &'static str, level: TraceLevel) -> TraceLine {
    TraceLine { text, level }
}

static ACCEPTED_TRACE: [TraceLine; 4] = [
    line("parrot.agent.boot();", TraceLevel::Info),
    line("parrot.decode(\"briefing.enc\");", TraceLevel::Info),
    line("decode: success", TraceLevel::Info),
    line("handoff.queue.push(\"owl\");", TraceLevel::Info),
];

static REJECTED_TRACE: [TraceLine; 4] = [
    line("parrot.agent.boot();", TraceLevel::Info),
    line("parrot.decode(\"briefing.enc\");", TraceLevel::Info),
    line("status: awaiting_key", TraceLevel::Warn),
    line("decode failed: access_key missing", TraceLevel::Error),
];

/// The fixed trace for a verification outcome.
pub fn outcome_to_trace(ok: bool) -> &'static [TraceLine] {
    if ok {
        &ACCEPTED_TRACE
    } else {
        &REJECTED_TRACE
    }
}
