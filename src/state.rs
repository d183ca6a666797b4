//! Application state
//!
//! Holds the configuration and the shared resolution components

use crate::candidate_synth::{Credentials, DEFAULT_PASSWORD, DEFAULT_USERNAME};
use crate::device_signature::SignatureRegistry;
use crate::error::{Error, Result};
use crate::probe_engine::{HttpSnapshotProbe, ProbeEngine, ProbeSettings, DEFAULT_MAX_CANDIDATES, DEFAULT_PROBE_TIMEOUT_MS};
use crate::resolver::Resolver;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// User agent legacy DVR web servers expect
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; WOW64; Trident/7.0; rv:11.0) like Gecko";

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Per-candidate probe budget
    pub probe_timeout_ms: u64,
    /// HTTP attempts per resolution
    pub max_candidates: usize,
    /// Credentials used when a request carries none
    pub default_username: String,
    pub default_password: String,
    /// 0 accepts any 2xx; otherwise an image body of at least this size is required
    pub min_snapshot_bytes: usize,
    /// Most DVRs ship self-signed certificates
    pub accept_invalid_certs: bool,
    pub user_agent: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            probe_timeout_ms: std::env::var("RESOLVER_PROBE_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|v| *v > 0)
                .unwrap_or(DEFAULT_PROBE_TIMEOUT_MS),
            max_candidates: std::env::var("RESOLVER_MAX_CANDIDATES")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|v| *v > 0)
                .unwrap_or(DEFAULT_MAX_CANDIDATES),
            default_username: std::env::var("RESOLVER_DEFAULT_USERNAME")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_USERNAME.to_string()),
            default_password: std::env::var("RESOLVER_DEFAULT_PASSWORD")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_PASSWORD.to_string()),
            min_snapshot_bytes: std::env::var("RESOLVER_MIN_SNAPSHOT_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
            accept_invalid_certs: std::env::var("RESOLVER_ACCEPT_INVALID_CERTS")
                .ok()
                .and_then(|v| parse_bool(&v))
                .unwrap_or(true),
            user_agent: std::env::var("RESOLVER_USER_AGENT")
                .unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string()),
        }
    }
}

impl AppConfig {
    /// Load from the process environment, rejecting invalid values
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup; unset keys take defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let probe_timeout_ms = parse_var(&lookup, "RESOLVER_PROBE_TIMEOUT_MS", DEFAULT_PROBE_TIMEOUT_MS)?;
        if probe_timeout_ms == 0 {
            return Err(Error::Config("RESOLVER_PROBE_TIMEOUT_MS must be > 0".to_string()));
        }
        let max_candidates = parse_var(&lookup, "RESOLVER_MAX_CANDIDATES", DEFAULT_MAX_CANDIDATES)?;
        if max_candidates == 0 {
            return Err(Error::Config("RESOLVER_MAX_CANDIDATES must be > 0".to_string()));
        }
        let accept_invalid_certs = match lookup("RESOLVER_ACCEPT_INVALID_CERTS") {
            Some(raw) => parse_bool(&raw).ok_or_else(|| {
                Error::Parse(format!("RESOLVER_ACCEPT_INVALID_CERTS: expected true/false, got {:?}", raw))
            })?,
            None => true,
        };
        let non_empty = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Ok(Self {
            probe_timeout_ms,
            max_candidates,
            default_username: non_empty("RESOLVER_DEFAULT_USERNAME", DEFAULT_USERNAME),
            default_password: non_empty("RESOLVER_DEFAULT_PASSWORD", DEFAULT_PASSWORD),
            min_snapshot_bytes: parse_var(&lookup, "RESOLVER_MIN_SNAPSHOT_BYTES", 0)?,
            accept_invalid_certs,
            user_agent: non_empty("RESOLVER_USER_AGENT", DEFAULT_USER_AGENT),
        })
    }

    pub fn probe_settings(&self) -> ProbeSettings {
        ProbeSettings {
            per_candidate_timeout: Duration::from_millis(self.probe_timeout_ms),
            max_candidates: self.max_candidates,
        }
    }

    pub fn default_credentials(&self) -> Credentials {
        Credentials::new(&self.default_username, &self.default_password)
    }
}

fn parse_var<T, F>(lookup: &F, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| Error::Parse(format!("{}: {} ({:?})", key, e, raw))),
        None => Ok(default),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Application state shared across tasks
#[derive(Clone)]
pub struct AppState {
    /// Application config
    pub config: AppConfig,
    /// Signature registry (builtin + learned)
    pub registry: Arc<SignatureRegistry>,
    /// Resolver over the HTTP probe
    pub resolver: Arc<Resolver>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self> {
        let registry = Arc::new(SignatureRegistry::with_builtin());
        let probe = Arc::new(HttpSnapshotProbe::from_config(&config)?);
        let engine = ProbeEngine::new(probe, config.probe_settings());
        let resolver = Arc::new(Resolver::new(
            registry.clone(),
            engine,
            config.default_credentials(),
        ));
        Ok(Self {
            config,
            registry,
            resolver,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.probe_timeout_ms, 5000);
        assert_eq!(config.max_candidates, 8);
        assert_eq!(config.default_username, "admin");
        assert_eq!(config.default_password, "admin");
        assert_eq!(config.min_snapshot_bytes, 0);
        assert!(config.accept_invalid_certs);
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("RESOLVER_PROBE_TIMEOUT_MS", "1500"),
            ("RESOLVER_MAX_CANDIDATES", "3"),
            ("RESOLVER_DEFAULT_USERNAME", "viewer"),
            ("RESOLVER_DEFAULT_PASSWORD", ""),
            ("RESOLVER_MIN_SNAPSHOT_BYTES", "1024"),
            ("RESOLVER_ACCEPT_INVALID_CERTS", "no"),
        ]))
        .unwrap();
        assert_eq!(config.probe_settings().per_candidate_timeout, Duration::from_millis(1500));
        assert_eq!(config.probe_settings().max_candidates, 3);
        let creds = config.default_credentials();
        assert_eq!(creds.username, "viewer");
        assert_eq!(creds.password, "admin");
        assert_eq!(config.min_snapshot_bytes, 1024);
        assert!(!config.accept_invalid_certs);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = AppConfig::from_lookup(lookup(&[("RESOLVER_MAX_CANDIDATES", "0")])).unwrap_err();
        assert_eq!(err.code(), "CONFIG_ERROR");

        let err = AppConfig::from_lookup(lookup(&[("RESOLVER_PROBE_TIMEOUT_MS", "soon")])).unwrap_err();
        assert_eq!(err.code(), "PARSE_ERROR");
        assert!(err.to_string().contains("RESOLVER_PROBE_TIMEOUT_MS"));

        let err = AppConfig::from_lookup(lookup(&[("RESOLVER_ACCEPT_INVALID_CERTS", "maybe")])).unwrap_err();
        assert_eq!(err.code(), "PARSE_ERROR");
    }

    #[tokio::test]
    async fn test_app_state_wires_resolver() {
        let config = AppConfig::from_lookup(lookup(&[("RESOLVER_MAX_CANDIDATES", "2")])).unwrap();
        let state = AppState::new(config).unwrap();
        assert_eq!(state.resolver.engine().settings().max_candidates, 2);
        assert!(!state.registry.is_empty().await);
    }
}
