//! Candidate synthesis types

use crate::device_signature::DeviceSignature;
use serde::{Deserialize, Serialize};

/// Factory default credentials of most DVRs
pub const DEFAULT_USERNAME: &str = "admin";
pub const DEFAULT_PASSWORD: &str = "admin";

/// Candidate priority tier. Declaration order is sort order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// Candidate endpoint kind
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum CandidateKind {
    /// Still image or MJPEG over HTTP(S); probe-able in process
    SnapshotHttp,
    /// RTSP; recommended to an external player, never validated
    Rtsp,
}

/// A synthesized endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CandidateEndpoint {
    pub url: String,
    pub kind: CandidateKind,
    pub brand: String,
    pub priority: Priority,
    /// Whether `url` embeds `user:pass@`
    pub authenticated: bool,
}

impl CandidateEndpoint {
    /// URL with the password masked, for logs and status lines
    pub fn display_url(&self) -> String {
        super::redact_credentials(&self.url)
    }

    pub fn is_http(&self) -> bool {
        self.kind == CandidateKind::SnapshotHttp
    }
}

/// Output of the synthesizer
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CandidateSet {
    pub snapshot: Vec<CandidateEndpoint>,
    pub rtsp: Vec<CandidateEndpoint>,
}

impl CandidateSet {
    /// Snapshot candidates followed by RTSP candidates, as handed to the probe engine
    pub fn all(&self) -> Vec<CandidateEndpoint> {
        self.snapshot.iter().chain(self.rtsp.iter()).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.snapshot.len() + self.rtsp.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.is_empty() && self.rtsp.is_empty()
    }
}

/// Device login credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Fill missing or empty values from `fallback`, field by field
    pub fn or_fallback(username: Option<&str>, password: Option<&str>, fallback: &Credentials) -> Self {
        let pick = |value: Option<&str>, default: &str| match value {
            Some(v) if !v.trim().is_empty() => v.to_string(),
            _ => default.to_string(),
        };
        Self {
            username: pick(username, &fallback.username),
            password: pick(password, &fallback.password),
        }
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self::new(DEFAULT_USERNAME, DEFAULT_PASSWORD)
    }
}

/// Everything needed to synthesize candidates for one device
#[derive(Debug, Clone, Serialize)]
pub struct ResolutionTarget {
    /// `http` or `https`
    pub scheme: String,
    pub host: String,
    /// Explicit non-default HTTP port
    pub port: Option<u16>,
    pub credentials: Credentials,
    pub signature: Option<DeviceSignature>,
    /// The raw host string could not be parsed and was used verbatim
    pub host_recovered: bool,
}
