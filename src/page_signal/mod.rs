//! Page Signal Extractor
//!
//! Scans a page's markup for embedded ActiveX CLSIDs and classifies URLs
//! that point at plugin installers.

use once_cell::sync::Lazy;
use regex::Regex;

/// `CLSID:XXXXXXXX-...` textual occurrences (braces optional)
static CLSID_TEXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)CLSID[:\s]*\{?([0-9A-F]{8}-[0-9A-F]{4}-[0-9A-F]{4}-[0-9A-F]{4}-[0-9A-F]{12})\}?",
    )
    .expect("valid CLSID regex")
});

/// `classid="clsid:..."` / `classid='clsid:...'` attribute occurrences
static CLASSID_ATTR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)classid\s*=\s*["']?clsid[:\s]*\{?([0-9A-F]{8}-[0-9A-F]{4}-[0-9A-F]{4}-[0-9A-F]{4}-[0-9A-F]{12})\}?["']?"#,
    )
    .expect("valid classid regex")
});

/// `href`/`src`/`codebase` attribute values
static LINK_ATTR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\b(?:href|src|codebase)\s*=\s*["']([^"']+)["']"#).expect("valid link regex")
});

static BARE_GUID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9A-F]{8}-[0-9A-F]{4}-[0-9A-F]{4}-[0-9A-F]{4}-[0-9A-F]{12}$").expect("valid GUID regex")
});

/// Installer/plugin file extensions
pub const PLUGIN_EXTENSIONS: &[&str] = &[".exe", ".ocx", ".cab", ".dll", ".msi"];

/// URL keywords that suggest a plugin download
pub const PLUGIN_KEYWORDS: &[&str] = &["plugin", "activex", "webcomponent", "ocx", "install", "download"];

/// Extract canonical CLSIDs from markup.
///
/// Deduplicated, uppercase, in order of first appearance.
pub fn extract_clsids(markup: &str) -> Vec<String> {
    let mut hits: Vec<(usize, String)> = Vec::new();
    for pattern in [&*CLSID_TEXT, &*CLASSID_ATTR] {
        for caps in pattern.captures_iter(markup) {
            if let Some(m) = caps.get(1) {
                hits.push((m.start(), m.as_str().to_uppercase()));
            }
        }
    }
    hits.sort_by_key(|(pos, _)| *pos);

    let mut found: Vec<String> = Vec::new();
    for (_, clsid) in hits {
        if !found.contains(&clsid) {
            found.push(clsid);
        }
    }
    found
}

/// Whether a URL looks like a plugin installer download.
///
/// Extension match wins outright; keyword matches are ignored for
/// `.html`/`.htm` pages that merely mention those words.
pub fn is_plugin_download_url(url: &str) -> bool {
    let lower = url.to_lowercase();
    let path = strip_query(&lower);

    if PLUGIN_EXTENSIONS
        .iter()
        .any(|ext| lower.ends_with(ext) || path.ends_with(ext))
    {
        return true;
    }

    if path.ends_with(".html") || path.ends_with(".htm") {
        return false;
    }

    PLUGIN_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// Lowercase basename of a URL or path, query string and fragment stripped
pub fn plugin_filename(url: &str) -> String {
    let lower = url.to_lowercase();
    let path = strip_query(&lower);
    path.rsplit(['/', '\\']).next().unwrap_or(path).to_string()
}

/// Plugin installer links referenced by the markup, first appearance order
pub fn extract_plugin_links(markup: &str) -> Vec<String> {
    let mut links: Vec<String> = Vec::new();
    for caps in LINK_ATTR.captures_iter(markup) {
        let Some(m) = caps.get(1) else { continue };
        let link = m.as_str().trim();
        // `#version=...` suffix on codebase attributes
        let link = link.split('#').next().unwrap_or(link);
        if !link.is_empty() && is_plugin_download_url(link) && !links.iter().any(|l| l == link) {
            links.push(link.to_string());
        }
    }
    links
}

/// Whether a canonical identifier has the 8-4-4-4-12 GUID shape
pub fn looks_like_clsid(canonical: &str) -> bool {
    BARE_GUID.is_match(canonical)
}

fn strip_query(url: &str) -> &str {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    &url[..end]
}
