//! Resolver types

use crate::candidate_synth::{CandidateEndpoint, CandidateSet};
use crate::playback_hint::PlaybackKind;
use crate::probe_engine::{ProbeOutcome, ProbeResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One resolution request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolutionRequest {
    /// Bare hostname, `host:port` or full page URL
    pub host: String,
    /// CLSID, installer filename/URL or brand token
    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
}

impl ResolutionRequest {
    pub fn new(host: impl Into<String>, identifier: Option<&str>) -> Self {
        Self {
            host: host.into(),
            identifier: identifier.map(str::to_string),
            ..Default::default()
        }
    }

    pub fn with_credentials(mut self, username: Option<&str>, password: Option<&str>) -> Self {
        self.username = username.map(str::to_string);
        self.password = password.map(str::to_string);
        self
    }
}

/// Event from the browser compatibility layer: a page asked for a plugin
#[derive(Debug, Clone, Deserialize)]
pub struct VendorObservation {
    pub identifier: String,
    /// URL of the page that requested the plugin
    pub page_url: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl VendorObservation {
    pub fn new(identifier: impl Into<String>, page_url: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            page_url: page_url.into(),
            username: None,
            password: None,
        }
    }

    pub fn into_request(self) -> ResolutionRequest {
        ResolutionRequest {
            host: self.page_url,
            identifier: Some(self.identifier),
            username: self.username,
            password: self.password,
        }
    }
}

/// Full outcome of one resolution, ready for the presentation layer
#[derive(Debug, Clone, Serialize)]
pub struct ResolutionReport {
    pub request_id: Uuid,
    /// Canonical identifier, when one was supplied
    pub identifier: Option<String>,
    pub brand: Option<String>,
    /// Whether the identifier matched a known signature
    pub detected: bool,
    pub host: String,
    pub snapshot_candidates: Vec<CandidateEndpoint>,
    pub rtsp_candidates: Vec<CandidateEndpoint>,
    pub probe: ProbeResult,
    /// How to play the resolved URL
    pub playback: Option<PlaybackKind>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl ResolutionReport {
    pub fn resolved_url(&self) -> Option<&str> {
        self.probe.outcome.resolved_url()
    }

    /// One-line status for the user
    pub fn summary(&self) -> String {
        let brand = self.brand.as_deref().unwrap_or("unknown device");
        match &self.probe.outcome {
            ProbeOutcome::Resolved { .. } => format!("Stream found ({})", brand),
            ProbeOutcome::RtspOnly => format!(
                "No snapshot endpoint answered for {}; {} RTSP URLs available for an external player",
                brand,
                self.rtsp_candidates.len()
            ),
            ProbeOutcome::Exhausted => format!(
                "No endpoint answered for {}; configure the stream URL manually",
                brand
            ),
        }
    }
}

/// Vendor identifiers found on a page
#[derive(Debug, Clone, Default, Serialize)]
pub struct PageSignals {
    /// Canonical CLSIDs in order of first appearance
    pub clsids: Vec<String>,
    /// Links that look like plugin installers
    pub plugin_links: Vec<String>,
    /// Identifier chosen for resolution
    pub selected: Option<String>,
    pub brand: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentAction {
    /// Known plugin; offer the alternatives instead of the plugin
    KnownNotInstalled,
    UnknownClsid,
}

/// What to tell the user when a page requests a plugin
#[derive(Debug, Clone, Serialize)]
pub struct IdentifierAssessment {
    pub clsid: String,
    pub known: bool,
    pub brand: Option<String>,
    pub action: AssessmentAction,
    pub message: String,
    pub alternatives: Option<CandidateSet>,
}
