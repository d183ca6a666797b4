//! Probe Engine
//!
//! ## Responsibilities
//!
//! - Try HTTP snapshot/MJPEG candidates strictly one at a time, in the
//!   order given (legacy DVR web servers lock out or drop concurrent
//!   connections)
//! - Bound every attempt with a timeout; a hung device costs one budget
//! - Stop at the first success
//! - Never probe RTSP; report `rtsp-only` so the caller can hand those
//!   URLs to an external player

mod http_probe;
mod types;

pub use http_probe::{build_client, HttpSnapshotProbe};
pub use types::*;

use crate::candidate_synth::{redact_credentials, CandidateEndpoint};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tokio::time::timeout;

/// Probe primitive: does this URL serve something that loads?
#[async_trait]
pub trait SnapshotProbe: Send + Sync {
    async fn check(&self, url: &str) -> Result<(), ProbeFailure>;
}

/// Sequential candidate prober
#[derive(Clone)]
pub struct ProbeEngine {
    probe: Arc<dyn SnapshotProbe>,
    settings: ProbeSettings,
}

impl ProbeEngine {
    pub fn new(probe: Arc<dyn SnapshotProbe>, settings: ProbeSettings) -> Self {
        Self { probe, settings }
    }

    pub fn settings(&self) -> ProbeSettings {
        self.settings
    }

    /// Probe with default options
    pub async fn probe(&self, candidates: &[CandidateEndpoint]) -> ProbeResult {
        self.probe_with(candidates, ProbeOptions::default()).await
    }

    /// Probe candidates in order until one loads.
    ///
    /// At most `max_candidates` HTTP attempts are made; RTSP candidates do
    /// not count against that limit.
    pub async fn probe_with(&self, candidates: &[CandidateEndpoint], options: ProbeOptions) -> ProbeResult {
        let started = Instant::now();
        let budget_ms = self.settings.per_candidate_timeout.as_millis() as u64;
        let total = candidates
            .iter()
            .filter(|c| c.is_http())
            .count()
            .min(self.settings.max_candidates);
        let has_rtsp = candidates.iter().any(|c| !c.is_http());

        let mut attempted = Vec::new();
        let mut failures = Vec::new();
        let mut attempts = 0usize;
        let mut cancelled = false;

        for candidate in candidates {
            if !candidate.is_http() {
                if options.include_rtsp {
                    attempted.push(candidate.clone());
                }
                continue;
            }
            if attempts >= self.settings.max_candidates {
                continue;
            }
            if options.cancel.as_ref().is_some_and(|rx| *rx.borrow()) {
                tracing::info!(attempts, "Probe cancelled between candidates");
                cancelled = true;
                break;
            }

            attempts += 1;
            let masked_url = redact_credentials(&candidate.url);
            tracing::debug!(
                attempt = attempts,
                total,
                brand = %candidate.brand,
                url = %masked_url,
                "Probing candidate"
            );
            if let Some(tx) = &options.progress {
                let _ = tx.send(ProbeProgress {
                    attempt: attempts,
                    total,
                    url: masked_url.clone(),
                    brand: candidate.brand.clone(),
                });
            }
            attempted.push(candidate.clone());

            let failure = match timeout(self.settings.per_candidate_timeout, self.probe.check(&candidate.url)).await {
                Ok(Ok(())) => {
                    tracing::info!(
                        attempt = attempts,
                        brand = %candidate.brand,
                        url = %masked_url,
                        "Stream endpoint resolved"
                    );
                    return ProbeResult {
                        attempted,
                        outcome: ProbeOutcome::Resolved {
                            url: candidate.url.clone(),
                        },
                        failures,
                        cancelled: false,
                        elapsed_ms: started.elapsed().as_millis() as u64,
                    };
                }
                Ok(Err(e)) => e,
                Err(_) => ProbeFailure::Timeout(budget_ms),
            };

            tracing::debug!(url = %masked_url, reason = %failure, "Candidate failed");
            failures.push(ProbeFailureRecord {
                url: masked_url,
                brand: candidate.brand.clone(),
                reason: failure.to_string(),
            });
        }

        let outcome = if has_rtsp {
            ProbeOutcome::RtspOnly
        } else {
            ProbeOutcome::Exhausted
        };
        tracing::info!(
            attempts,
            cancelled,
            outcome = ?outcome,
            "No HTTP candidate validated"
        );

        ProbeResult {
            attempted,
            outcome,
            failures,
            cancelled,
            elapsed_ms: started.elapsed().as_millis() as u64,
        }
    }
}
