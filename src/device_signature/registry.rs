//! Signature registry
//!
//! Read-mostly map of canonical identifier -> signature. Lookups take the
//! read lock; `learn` is the only writer.

use super::builtin_data::{BRAND_TOKENS, BUILTIN_CLSIDS, PLUGIN_FILES};
use super::types::*;
use crate::page_signal::plugin_filename;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Canonicalize a vendor identifier
///
/// Strips a leading `CLSID:` (any case), surrounding braces and whitespace,
/// then uppercases. Already-canonical input is returned unchanged.
pub fn normalize_identifier(identifier: &str) -> String {
    let mut s = identifier.trim();
    if s.get(..6).is_some_and(|prefix| prefix.eq_ignore_ascii_case("clsid:")) {
        s = s[6..].trim();
    }
    let s = s.trim_start_matches('{').trim_end_matches('}').trim();
    s.to_uppercase()
}

/// Device signature registry
pub struct SignatureRegistry {
    signatures: RwLock<HashMap<String, DeviceSignature>>,
}

impl SignatureRegistry {
    /// Registry seeded with the built-in CLSID table
    pub fn with_builtin() -> Self {
        let map = BUILTIN_CLSIDS
            .iter()
            .map(|row| (row.id.to_string(), row.to_signature()))
            .collect::<HashMap<_, _>>();
        debug!(count = map.len(), "Signature registry seeded");
        Self {
            signatures: RwLock::new(map),
        }
    }

    /// Registry with no entries (tests, operator-only setups)
    pub fn empty() -> Self {
        Self {
            signatures: RwLock::new(HashMap::new()),
        }
    }

    /// Exact-match lookup on the canonical identifier.
    /// `None` is the normal outcome for unclassified devices.
    pub async fn resolve_by_id(&self, identifier: &str) -> Option<DeviceSignature> {
        let key = normalize_identifier(identifier);
        if key.is_empty() {
            return None;
        }
        let signatures = self.signatures.read().await;
        signatures.get(&key).cloned()
    }

    /// Classify a plugin download by filename, then by brand tokens in the URL.
    /// Never returns "nothing": falls back to the Unknown sentinel.
    pub fn resolve_by_filename_or_url(&self, text: &str) -> DeviceSignature {
        let lower = text.to_lowercase();
        let filename = plugin_filename(&lower);

        if let Some(row) = PLUGIN_FILES.iter().find(|row| filename.contains(row.filename)) {
            return row.to_signature();
        }

        for (token, file) in BRAND_TOKENS {
            if lower.contains(token) {
                if let Some(row) = PLUGIN_FILES.iter().find(|row| row.filename == *file) {
                    return row.to_signature();
                }
            }
        }

        DeviceSignature::unknown()
    }

    /// Register a new signature keyed by a newly observed identifier.
    ///
    /// Returns false when the identifier is already known (first registration
    /// wins) or when the identifier/config is unusable.
    pub async fn learn(&self, identifier: &str, brand: &str, config: LearnConfig) -> bool {
        let key = normalize_identifier(identifier);
        if key.is_empty() || brand.trim().is_empty() {
            warn!(identifier = %identifier, "Rejected learn request: empty identifier or brand");
            return false;
        }
        if let Err(reason) = config.validate() {
            warn!(identifier = %key, reason = %reason, "Rejected learn request");
            return false;
        }

        let mut signatures = self.signatures.write().await;
        if signatures.contains_key(&key) {
            debug!(identifier = %key, "Identifier already registered, keeping existing entry");
            return false;
        }

        let signature = DeviceSignature {
            id: key.clone(),
            brand: brand.trim().to_string(),
            rtsp_port: config.rtsp_port.unwrap_or(DEFAULT_RTSP_PORT),
            snapshot_path: config.snapshot_path,
            rtsp_paths: config.rtsp_paths,
            origin: SignatureOrigin::Learned,
            learned_at: Some(Utc::now()),
        };
        info!(
            identifier = %key,
            brand = %signature.brand,
            rtsp_paths = signature.rtsp_paths.len(),
            "Learned new device signature"
        );
        signatures.insert(key, signature);
        true
    }

    pub async fn len(&self) -> usize {
        self.signatures.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.signatures.read().await.is_empty()
    }

    /// All signatures, sorted by identifier
    pub async fn list(&self) -> Vec<DeviceSignature> {
        let signatures = self.signatures.read().await;
        let mut all: Vec<DeviceSignature> = signatures.values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all
    }
}

impl Default for SignatureRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_normalize_identifier() {
        assert_eq!(
            normalize_identifier("CLSID:{b6d5419c-d381-4687-9cfc-a9e2cd7008f5}"),
            "B6D5419C-D381-4687-9CFC-A9E2CD7008F5"
        );
        assert_eq!(
            normalize_identifier("clsid: E0DA039D-992F-4187-A105-C699A71F5F06"),
            "E0DA039D-992F-4187-A105-C699A71F5F06"
        );
        assert_eq!(normalize_identifier("  {55f88890-de29-4e36-b13b-e0774cac9c5a} "), "55F88890-DE29-4E36-B13B-E0774CAC9C5A");
        assert_eq!(normalize_identifier(""), "");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for raw in [
            "CLSID:{b6d5419c-d381-4687-9cfc-a9e2cd7008f5}",
            "{4B3476C6-3A85-4F86-8418-D1130C952B05}",
            "webcomponents.exe",
            "b6d5419c",
        ] {
            let once = normalize_identifier(raw);
            assert_eq!(normalize_identifier(&once), once);
        }
    }

    #[tokio::test]
    async fn test_resolve_by_id_variants() {
        let registry = SignatureRegistry::with_builtin();

        let sig = registry
            .resolve_by_id("CLSID:{b6d5419c-d381-4687-9cfc-a9e2cd7008f5}")
            .await
            .unwrap();
        assert_eq!(sig.brand, "Ipega");
        assert_eq!(sig.origin, SignatureOrigin::Builtin);

        let canonical = registry
            .resolve_by_id(&normalize_identifier("clsid:{b6d5419c-d381-4687-9cfc-a9e2cd7008f5}"))
            .await;
        assert_eq!(canonical, Some(sig));

        let short = registry.resolve_by_id("b6d5419c").await.unwrap();
        assert_eq!(short.rtsp_paths.len(), 4);
    }

    #[tokio::test]
    async fn test_resolve_by_id_unknown() {
        let registry = SignatureRegistry::with_builtin();
        assert!(registry
            .resolve_by_id("00000000-0000-0000-0000-000000000000")
            .await
            .is_none());
        assert!(registry.resolve_by_id("").await.is_none());
        // no fuzzy/prefix matching
        assert!(registry.resolve_by_id("B6D5419C-D381").await.is_none());
    }

    #[test]
    fn test_resolve_by_filename() {
        let registry = SignatureRegistry::empty();

        let sig = registry.resolve_by_filename_or_url("http://10.0.0.5/codebase/WebComponents.exe?v=3");
        assert_eq!(sig.brand, "Hikvision");
        assert_eq!(sig.rtsp_paths, vec!["/Streaming/Channels/101".to_string()]);

        let sig = registry.resolve_by_filename_or_url("HWDVRPlugin.ocx");
        assert_eq!(sig.brand, "Ipega");

        let sig = registry.resolve_by_filename_or_url("http://dvr/download/Intelbras.exe");
        assert_eq!(sig.brand, "Intelbras");
    }

    #[test]
    fn test_resolve_by_brand_token() {
        let registry = SignatureRegistry::empty();

        let sig = registry.resolve_by_filename_or_url("http://cdn.dahua-tech.net/setup.exe");
        assert_eq!(sig.brand, "Dahua");

        let sig = registry.resolve_by_filename_or_url("http://192.168.0.10/KP-CA/player.msi");
        assert_eq!(sig.brand, "Ipega");
        assert_eq!(sig.rtsp_paths, vec!["/profile0".to_string()]);
    }

    #[test]
    fn test_resolve_unknown_fallback() {
        let registry = SignatureRegistry::empty();
        let sig = registry.resolve_by_filename_or_url("totally-unknown-file.exe");
        assert_eq!(sig.brand, UNKNOWN_BRAND);
        assert!(sig.is_unknown());
        assert!(!sig.rtsp_paths.is_empty());
        assert_eq!(sig.rtsp_port, 554);
    }

    #[tokio::test]
    async fn test_learn_first_registration_wins() {
        let registry = SignatureRegistry::with_builtin();
        let before = registry.len().await;

        let config = LearnConfig {
            rtsp_port: Some(8554),
            snapshot_path: Some("/tmpfs/auto.jpg".to_string()),
            rtsp_paths: vec!["/ch0".to_string()],
        };
        assert!(registry.learn("{12345678-AAAA-BBBB-CCCC-1234567890AB}", "Acme", config).await);
        assert_eq!(registry.len().await, before + 1);

        // duplicate does not overwrite
        assert!(!registry
            .learn("clsid:12345678-aaaa-bbbb-cccc-1234567890ab", "Other", LearnConfig::default())
            .await);

        let sig = registry.resolve_by_id("12345678-AAAA-BBBB-CCCC-1234567890AB").await.unwrap();
        assert_eq!(sig.brand, "Acme");
        assert_eq!(sig.rtsp_port, 8554);
        assert_eq!(sig.origin, SignatureOrigin::Learned);
        assert!(sig.learned_at.is_some());
    }

    #[tokio::test]
    async fn test_learn_does_not_overwrite_builtin() {
        let registry = SignatureRegistry::with_builtin();
        assert!(!registry
            .learn("55F88890-DE29-4E36-B13B-E0774CAC9C5A", "Impostor", LearnConfig::default())
            .await);
        let sig = registry.resolve_by_id("55F88890-DE29-4E36-B13B-E0774CAC9C5A").await.unwrap();
        assert_eq!(sig.brand, "Hikvision");
    }

    #[tokio::test]
    async fn test_learn_rejects_invalid() {
        let registry = SignatureRegistry::empty();
        assert!(!registry.learn("", "Acme", LearnConfig::default()).await);
        assert!(!registry.learn("ABCD", "  ", LearnConfig::default()).await);
        let bad = LearnConfig {
            rtsp_paths: vec!["no-slash".to_string()],
            ..Default::default()
        };
        assert!(!registry.learn("ABCD", "Acme", bad).await);
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_concurrent_learn_is_serialized() {
        let registry = Arc::new(SignatureRegistry::empty());
        let mut handles = Vec::new();
        for i in 0..8 {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move {
                registry
                    .learn("AAAAAAAA-0000-0000-0000-000000000001", &format!("Brand{}", i), LearnConfig::default())
                    .await
            }));
        }
        let mut wins = 0;
        for h in handles {
            if h.await.unwrap() {
                wins += 1;
            }
        }
        assert_eq!(wins, 1);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_list_sorted() {
        let registry = SignatureRegistry::with_builtin();
        let all = registry.list().await;
        assert_eq!(all.len(), BUILTIN_CLSIDS.len());
        assert!(all.windows(2).all(|w| w[0].id <= w[1].id));
    }
}
