//! Host parsing for resolution targets

use super::types::{Credentials, ResolutionTarget};
use crate::device_signature::DeviceSignature;
use tracing::warn;
use url::Url;

/// Parsed origin of the device's web page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostParts {
    pub scheme: String,
    pub host: String,
    pub port: Option<u16>,
    /// Percent-decoded userinfo from `user:pass@host`
    pub username: Option<String>,
    pub password: Option<String>,
    pub recovered: bool,
}

/// Parse a bare hostname, `host:port` or full URL.
///
/// Anything the URL parser rejects is used verbatim as a hostname on the
/// default HTTP port, minus any scheme, path and userinfo.
pub fn parse_host(raw: &str) -> HostParts {
    let trimmed = raw.trim();
    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    };

    match Url::parse(&candidate) {
        Ok(url) => match url.host_str() {
            Some(host) if !host.is_empty() => {
                let (scheme, port) = match url.scheme() {
                    "http" | "https" => (url.scheme().to_string(), url.port()),
                    // rtsp://, ftp:// etc. carry a port that is not the web port
                    _ => ("http".to_string(), None),
                };
                HostParts {
                    scheme,
                    host: host.to_string(),
                    port,
                    username: Some(url.username()).filter(|u| !u.is_empty()).map(decode),
                    password: url.password().filter(|p| !p.is_empty()).map(decode),
                    recovered: false,
                }
            }
            _ => recovered(trimmed, "URL has no host"),
        },
        Err(e) => recovered(trimmed, &e.to_string()),
    }
}

fn decode(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

fn explicit(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn recovered(raw: &str, reason: &str) -> HostParts {
    warn!(
        host = %super::redact_credentials(raw),
        reason = %reason,
        "Malformed host, using raw string as hostname"
    );

    let without_scheme = raw.find("://").map(|i| &raw[i + 3..]).unwrap_or(raw);
    let end = without_scheme.find(['/', '?', '#']).unwrap_or(without_scheme.len());
    let authority = &without_scheme[..end];

    let (userinfo, host) = match authority.rfind('@') {
        Some(at) => (Some(&authority[..at]), &authority[at + 1..]),
        None => (None, authority),
    };
    let (username, password) = match userinfo {
        Some(info) => match info.split_once(':') {
            Some((user, pass)) => (Some(user), Some(pass)),
            None => (Some(info), None),
        },
        None => (None, None),
    };

    HostParts {
        scheme: "http".to_string(),
        host: host.to_string(),
        port: None,
        username: username.filter(|u| !u.is_empty()).map(decode),
        password: password.filter(|p| !p.is_empty()).map(decode),
        recovered: true,
    }
}

impl ResolutionTarget {
    /// Build a target from the page origin, credentials and an optional signature.
    /// Empty credentials fall back to `admin`/`admin`.
    pub fn new(
        host: &str,
        username: Option<&str>,
        password: Option<&str>,
        signature: Option<DeviceSignature>,
    ) -> Self {
        Self::with_fallback(host, username, password, &Credentials::default(), signature)
    }

    /// Credentials are taken field by field from the explicit values, then
    /// from userinfo embedded in `host`, then from `fallback`.
    pub fn with_fallback(
        host: &str,
        username: Option<&str>,
        password: Option<&str>,
        fallback: &Credentials,
        signature: Option<DeviceSignature>,
    ) -> Self {
        let parts = parse_host(host);
        let credentials = Credentials::or_fallback(
            explicit(username).or(parts.username.as_deref()),
            explicit(password).or(parts.password.as_deref()),
            fallback,
        );
        Self::from_parts(parts, credentials, signature)
    }

    pub fn with_credentials(host: &str, credentials: Credentials, signature: Option<DeviceSignature>) -> Self {
        Self::from_parts(parse_host(host), credentials, signature)
    }

    fn from_parts(parts: HostParts, credentials: Credentials, signature: Option<DeviceSignature>) -> Self {
        Self {
            scheme: parts.scheme,
            host: parts.host,
            port: parts.port,
            credentials,
            signature,
            host_recovered: parts.recovered,
        }
    }

    /// Brand of the matched signature, if any
    pub fn brand(&self) -> Option<&str> {
        self.signature.as_ref().map(|s| s.brand.as_str())
    }
}
