//! Resolver
//!
//! Orchestrates identification, candidate synthesis and probing for one
//! device page, and serves the stream of vendor observations emitted by
//! the browser compatibility layer.
//!
//! ## Flow
//!
//! identifier -> `identify` -> `ResolutionTarget` -> `synthesize` ->
//! `ProbeEngine` -> `ResolutionReport`

mod types;

pub use types::*;

use crate::candidate_synth::{redact_credentials, synthesize, CandidateSet, Credentials, ResolutionTarget};
use crate::device_signature::{normalize_identifier, DeviceSignature, SignatureRegistry};
use crate::page_signal::{extract_clsids, extract_plugin_links, looks_like_clsid};
use crate::playback_hint::PlaybackKind;
use crate::probe_engine::{ProbeEngine, ProbeOptions};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Device resolution service
pub struct Resolver {
    registry: Arc<SignatureRegistry>,
    engine: ProbeEngine,
    default_credentials: Credentials,
}

impl Resolver {
    pub fn new(registry: Arc<SignatureRegistry>, engine: ProbeEngine, default_credentials: Credentials) -> Self {
        Self {
            registry,
            engine,
            default_credentials,
        }
    }

    pub fn registry(&self) -> &Arc<SignatureRegistry> {
        &self.registry
    }

    pub fn engine(&self) -> &ProbeEngine {
        &self.engine
    }

    /// Identify a device from a CLSID, installer filename/URL or brand token.
    ///
    /// GUID-shaped identifiers are looked up by CLSID only; anything else
    /// also goes through filename and brand-token classification.
    pub async fn identify(&self, identifier: &str) -> Option<DeviceSignature> {
        let canonical = normalize_identifier(identifier);
        if canonical.is_empty() {
            return None;
        }
        if let Some(sig) = self.registry.resolve_by_id(&canonical).await {
            return Some(sig);
        }
        if looks_like_clsid(&canonical) {
            return None;
        }
        let sig = self.registry.resolve_by_filename_or_url(identifier);
        (!sig.is_unknown()).then_some(sig)
    }

    /// Build the resolution target for a request
    pub async fn target(&self, request: &ResolutionRequest) -> ResolutionTarget {
        let signature = match request.identifier.as_deref() {
            Some(id) => self.identify(id).await,
            None => None,
        };
        ResolutionTarget::with_fallback(
            &request.host,
            request.username.as_deref(),
            request.password.as_deref(),
            &self.default_credentials,
            signature,
        )
    }

    /// Synthesize candidates without probing
    pub async fn candidates(&self, request: &ResolutionRequest) -> CandidateSet {
        let target = self.target(request).await;
        synthesize(&target)
    }

    pub async fn resolve(&self, request: ResolutionRequest) -> ResolutionReport {
        self.resolve_with(request, ProbeOptions::default()).await
    }

    /// Identify, synthesize and probe; always returns a report
    pub async fn resolve_with(&self, request: ResolutionRequest, options: ProbeOptions) -> ResolutionReport {
        let request_id = Uuid::new_v4();
        let started_at = Utc::now();

        let target = self.target(&request).await;
        let candidates = synthesize(&target);
        let brand = target.brand().map(str::to_string);

        info!(
            request_id = %request_id,
            host = %target.host,
            brand = brand.as_deref().unwrap_or("unknown"),
            snapshot = candidates.snapshot.len(),
            rtsp = candidates.rtsp.len(),
            "Resolving stream endpoint"
        );
        if target.host_recovered {
            warn!(
                request_id = %request_id,
                host = %redact_credentials(&request.host),
                "Resolving against unparsed host string"
            );
        }

        let probe = self.engine.probe_with(&candidates.all(), options).await;
        let playback = probe.outcome.resolved_url().map(PlaybackKind::detect);

        ResolutionReport {
            request_id,
            identifier: request
                .identifier
                .as_deref()
                .map(normalize_identifier)
                .filter(|id| !id.is_empty()),
            detected: target.signature.is_some(),
            brand,
            host: target.host,
            snapshot_candidates: candidates.snapshot,
            rtsp_candidates: candidates.rtsp,
            probe,
            playback,
            started_at,
            finished_at: Utc::now(),
        }
    }

    /// Find vendor identifiers in a page.
    ///
    /// The first recognised CLSID is selected; failing that, the first
    /// installer link with a known filename; failing that, the first CLSID.
    pub async fn scan_page(&self, markup: &str) -> PageSignals {
        let clsids = extract_clsids(markup);
        let plugin_links = extract_plugin_links(markup);

        let mut selected = None;
        let mut brand = None;

        for clsid in &clsids {
            if let Some(sig) = self.registry.resolve_by_id(clsid).await {
                selected = Some(clsid.clone());
                brand = Some(sig.brand);
                break;
            }
        }
        if selected.is_none() {
            for link in &plugin_links {
                let sig = self.registry.resolve_by_filename_or_url(link);
                if !sig.is_unknown() {
                    selected = Some(link.clone());
                    brand = Some(sig.brand);
                    break;
                }
            }
        }
        if selected.is_none() {
            selected = clsids.first().cloned();
        }

        debug!(
            clsids = clsids.len(),
            links = plugin_links.len(),
            selected = selected.as_deref().unwrap_or("-"),
            "Page scanned"
        );

        PageSignals {
            clsids,
            plugin_links,
            selected,
            brand,
        }
    }

    /// Scan a page and resolve the device behind it
    pub async fn resolve_page(
        &self,
        markup: &str,
        page_url: &str,
        username: Option<&str>,
        password: Option<&str>,
    ) -> (PageSignals, ResolutionReport) {
        let signals = self.scan_page(markup).await;
        let request = ResolutionRequest::new(page_url, signals.selected.as_deref()).with_credentials(username, password);
        let report = self.resolve(request).await;
        (signals, report)
    }

    /// Decide what to tell the user when a page requests a plugin
    pub async fn assess(&self, identifier: &str, host: &str) -> IdentifierAssessment {
        let clsid = normalize_identifier(identifier);
        match self.registry.resolve_by_id(&clsid).await {
            Some(sig) => {
                let target = ResolutionTarget::with_fallback(host, None, None, &self.default_credentials, Some(sig.clone()));
                let alternatives = synthesize(&target);
                IdentifierAssessment {
                    message: format!(
                        "{} plugin is not available; {} alternative stream URLs generated",
                        sig.brand,
                        alternatives.len()
                    ),
                    clsid,
                    known: true,
                    brand: Some(sig.brand),
                    action: AssessmentAction::KnownNotInstalled,
                    alternatives: Some(alternatives),
                }
            }
            None => IdentifierAssessment {
                message: format!("Unknown ActiveX control: {}", clsid),
                clsid,
                known: false,
                brand: None,
                action: AssessmentAction::UnknownClsid,
                alternatives: None,
            },
        }
    }

    /// Resolve each observation in arrival order.
    ///
    /// Reports are sent on the returned channel; the task ends when the
    /// observation sender is dropped or the report receiver goes away.
    pub fn listen(
        self: Arc<Self>,
        mut observations: mpsc::Receiver<VendorObservation>,
    ) -> (JoinHandle<()>, mpsc::UnboundedReceiver<ResolutionReport>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(async move {
            info!("Vendor observation listener started");
            while let Some(observation) = observations.recv().await {
                debug!(
                    identifier = %observation.identifier,
                    page = %observation.page_url,
                    "Vendor observation received"
                );
                let report = self.resolve(observation.into_request()).await;
                if tx.send(report).is_err() {
                    warn!("Report receiver dropped, stopping listener");
                    break;
                }
            }
            info!("Vendor observation listener stopped");
        });
        (handle, rx)
    }
}
