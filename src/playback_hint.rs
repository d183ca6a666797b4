//! Playback hint for a resolved URL
//!
//! Tells the playback layer whether to refresh a still image, attach an
//! MJPEG stream, or hand the URL to an external RTSP player.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static IMAGE_EXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.(jpg|jpeg|png|gif)(\?|$)").expect("valid image regex"));

/// How a URL should be played
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackKind {
    Rtsp,
    Hls,
    Mjpeg,
    /// Still image, refreshed periodically
    Image,
    /// Unknown; try as a direct media source
    Direct,
}

impl PlaybackKind {
    pub fn detect(url: &str) -> Self {
        let lower = url.to_lowercase();
        if lower.starts_with("rtsp://") {
            PlaybackKind::Rtsp
        } else if lower.contains(".m3u8") {
            PlaybackKind::Hls
        } else if lower.contains("mjpg") || lower.contains("mjpeg") {
            PlaybackKind::Mjpeg
        } else if IMAGE_EXT.is_match(&lower) {
            PlaybackKind::Image
        } else {
            PlaybackKind::Direct
        }
    }
}
