//! Probe engine types

use crate::candidate_synth::CandidateEndpoint;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::{mpsc, watch};

/// Default per-candidate budget
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 5000;
/// Default number of HTTP attempts per resolution
pub const DEFAULT_MAX_CANDIDATES: usize = 8;

/// Why a single candidate failed. All variants are handled identically:
/// the engine moves on to the next candidate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProbeFailure {
    #[error("timed out after {0} ms")]
    Timeout(u64),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected content type: {0}")]
    NotAnImage(String),

    #[error("body too small: {got} < {min} bytes")]
    TooSmall { got: usize, min: usize },
}

/// How strictly a 2xx response is judged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase", tag = "mode")]
pub enum ProbePolicy {
    /// Any 2xx whose headers arrive in time counts
    #[default]
    Permissive,
    /// Image/MJPEG content type and at least `min_bytes` of body
    Strict { min_bytes: usize },
}

impl ProbePolicy {
    /// 0 means permissive
    pub fn from_min_bytes(min_bytes: usize) -> Self {
        if min_bytes == 0 {
            ProbePolicy::Permissive
        } else {
            ProbePolicy::Strict { min_bytes }
        }
    }
}

/// Engine limits
#[derive(Debug, Clone, Copy)]
pub struct ProbeSettings {
    pub per_candidate_timeout: Duration,
    pub max_candidates: usize,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            per_candidate_timeout: Duration::from_millis(DEFAULT_PROBE_TIMEOUT_MS),
            max_candidates: DEFAULT_MAX_CANDIDATES,
        }
    }
}

/// "Trying URL N of M"
#[derive(Debug, Clone, Serialize)]
pub struct ProbeProgress {
    pub attempt: usize,
    pub total: usize,
    /// Password masked
    pub url: String,
    pub brand: String,
}

/// Per-call options
#[derive(Debug, Default)]
pub struct ProbeOptions {
    /// Record RTSP candidates in `attempted` for display
    pub include_rtsp: bool,
    /// Checked between candidates; `true` stops the loop
    pub cancel: Option<watch::Receiver<bool>>,
    pub progress: Option<mpsc::UnboundedSender<ProbeProgress>>,
}

/// Final state of a probe run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum ProbeOutcome {
    Resolved { url: String },
    /// Every HTTP candidate failed and there is no RTSP fallback
    Exhausted,
    /// Every HTTP candidate failed; RTSP candidates should be offered
    RtspOnly,
}

impl ProbeOutcome {
    pub fn resolved_url(&self) -> Option<&str> {
        match self {
            ProbeOutcome::Resolved { url } => Some(url),
            _ => None,
        }
    }
}

/// One failed attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeFailureRecord {
    /// Password masked
    pub url: String,
    pub brand: String,
    pub reason: String,
}

/// Result of probing a candidate list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeResult {
    pub attempted: Vec<CandidateEndpoint>,
    pub outcome: ProbeOutcome,
    pub failures: Vec<ProbeFailureRecord>,
    pub cancelled: bool,
    pub elapsed_ms: u64,
}

impl ProbeResult {
    pub fn is_resolved(&self) -> bool {
        matches!(self.outcome, ProbeOutcome::Resolved { .. })
    }
}
