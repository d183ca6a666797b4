//! Device signature types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default RTSP port used by nearly every DVR family
pub const DEFAULT_RTSP_PORT: u16 = 554;

/// Brand reported when nothing matched
pub const UNKNOWN_BRAND: &str = "Unknown";

/// Where a signature came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SignatureOrigin {
    /// Static table compiled into the binary
    Builtin,
    /// Registered at runtime through `learn`
    Learned,
    /// Synthetic "Unknown" sentinel
    Fallback,
}

/// Descriptor of a device/vendor family
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeviceSignature {
    /// Canonical identifier (unbraced uppercase CLSID, or a filename/keyword token)
    pub id: String,
    pub brand: String,
    pub rtsp_port: u16,
    /// Likely snapshot endpoint (path + optional query)
    pub snapshot_path: Option<String>,
    /// Candidate RTSP paths, most likely first
    pub rtsp_paths: Vec<String>,
    pub origin: SignatureOrigin,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learned_at: Option<DateTime<Utc>>,
}

impl DeviceSignature {
    /// The sentinel returned when neither filename nor brand token matched
    pub fn unknown() -> Self {
        Self {
            id: String::new(),
            brand: UNKNOWN_BRAND.to_string(),
            rtsp_port: DEFAULT_RTSP_PORT,
            snapshot_path: None,
            rtsp_paths: vec!["/stream1".to_string()],
            origin: SignatureOrigin::Fallback,
            learned_at: None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.origin == SignatureOrigin::Fallback
    }
}

/// Static CLSID table row
#[derive(Debug, Clone, Copy)]
pub struct BuiltinSignature {
    pub id: &'static str,
    pub brand: &'static str,
    pub rtsp_port: u16,
    pub snapshot_path: Option<&'static str>,
    pub rtsp_paths: &'static [&'static str],
}

impl BuiltinSignature {
    pub fn to_signature(&self) -> DeviceSignature {
        DeviceSignature {
            id: self.id.to_string(),
            brand: self.brand.to_string(),
            rtsp_port: self.rtsp_port,
            snapshot_path: self.snapshot_path.map(str::to_string),
            rtsp_paths: self.rtsp_paths.iter().map(|p| p.to_string()).collect(),
            origin: SignatureOrigin::Builtin,
            learned_at: None,
        }
    }
}

/// Static installer/plugin filename table row
#[derive(Debug, Clone, Copy)]
pub struct PluginFile {
    /// Lowercase filename matched as a substring of the URL basename
    pub filename: &'static str,
    pub brand: &'static str,
    pub rtsp_port: u16,
    pub rtsp_path: &'static str,
}

impl PluginFile {
    pub fn to_signature(&self) -> DeviceSignature {
        DeviceSignature {
            id: self.filename.to_string(),
            brand: self.brand.to_string(),
            rtsp_port: self.rtsp_port,
            snapshot_path: None,
            rtsp_paths: vec![self.rtsp_path.to_string()],
            origin: SignatureOrigin::Builtin,
            learned_at: None,
        }
    }
}

/// Configuration supplied when an operator confirms a new CLSID mapping
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LearnConfig {
    #[serde(default)]
    pub rtsp_port: Option<u16>,
    #[serde(default)]
    pub snapshot_path: Option<String>,
    #[serde(default)]
    pub rtsp_paths: Vec<String>,
}

impl LearnConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.rtsp_port == Some(0) {
            return Err("rtsp_port must be 1-65535".to_string());
        }
        if let Some(ref path) = self.snapshot_path {
            if !path.starts_with('/') {
                return Err("snapshot_path must start with /".to_string());
            }
        }
        if let Some(bad) = self.rtsp_paths.iter().find(|p| !p.starts_with('/')) {
            return Err(format!("rtsp path must start with /: {}", bad));
        }
        Ok(())
    }
}
