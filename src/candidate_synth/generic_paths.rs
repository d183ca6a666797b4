use super::types::Priority;

/// Generic snapshot/MJPEG endpoint row
#[derive(Debug, Clone, Copy)]
pub struct GenericSnapshotPath {
    pub path: &'static str,
    pub brand: &'static str,
    pub priority: Priority,
    /// Also emit the uncredentialed form
    pub with_plain: bool,
}

/// Generic RTSP path row
#[derive(Debug, Clone, Copy)]
pub struct GenericRtspPath {
    pub path: &'static str,
    pub brand: &'static str,
    pub priority: Priority,
}

const fn snap(path: &'static str, brand: &'static str, priority: Priority, with_plain: bool) -> GenericSnapshotPath {
    GenericSnapshotPath { path, brand, priority, with_plain }
}

const fn rtsp(path: &'static str, brand: &'static str, priority: Priority) -> GenericRtspPath {
    GenericRtspPath { path, brand, priority }
}

/// Brand-agnostic HTTP endpoints appended to every candidate set
pub const GENERIC_SNAPSHOT_PATHS: &[GenericSnapshotPath] = &[
    // ONVIF device service (Qualvision/Tecvoz and most Chinese OEMs)
    snap("/onvif/device_service", "Qualvision/Tecvoz", Priority::Medium, true),
    // Hikvision ISAPI
    snap("/ISAPI/Streaming/channels/101/picture", "Hikvision", Priority::Medium, false),
    // Dahua / Intelbras
    snap("/cgi-bin/snapshot.cgi?channel=1", "Dahua", Priority::Medium, false),
    // Generic stills
    snap("/snapshot.jpg", "Generic", Priority::Low, false),
    snap("/cgi-bin/snapshot.cgi", "Generic", Priority::Low, false),
    snap("/image.jpg", "Generic", Priority::Low, false),
    snap("/jpg/image.jpg", "Generic", Priority::Low, false),
    snap("/capture/image.jpg", "Generic", Priority::Low, false),
    snap("/snap.jpg", "Generic", Priority::Low, false),
    snap("/tmpfs/auto.jpg", "Generic", Priority::Low, false),
    snap("/onvif-http/snapshot", "Generic", Priority::Low, false),
    // MJPEG over HTTP
    snap("/video.mjpg", "Generic", Priority::Low, true),
    snap("/mjpg/video.mjpg", "Generic", Priority::Low, true),
    snap("/cgi-bin/mjpg/video.cgi", "Generic", Priority::Low, true),
    snap("/axis-cgi/mjpg/video.cgi", "Axis", Priority::Low, true),
    snap("/videostream.cgi", "Foscam", Priority::Low, true),
];

/// RTSP conventions tried when the device family is unknown
pub const GENERIC_RTSP_PATHS: &[GenericRtspPath] = &[
    // Hikvision
    rtsp("/Streaming/Channels/101", "Hikvision", Priority::Medium),
    rtsp("/Streaming/Channels/102", "Hikvision", Priority::Medium),
    rtsp("/Streaming/Channels/201", "Hikvision", Priority::Medium),
    rtsp("/h264/ch1/main/av_stream", "Hikvision", Priority::Medium),
    rtsp("/h264/ch1/sub/av_stream", "Hikvision", Priority::Medium),
    // Dahua / Intelbras
    rtsp("/cam/realmonitor?channel=1&subtype=0", "Dahua", Priority::Medium),
    rtsp("/cam/realmonitor?channel=1&subtype=1", "Dahua", Priority::Medium),
    // Ipega / KP-CA series
    rtsp("/profile0", "Ipega", Priority::Medium),
    rtsp("/profile1", "Ipega", Priority::Medium),
    rtsp("/11", "Ipega", Priority::Medium),
    rtsp("/onvif1", "Ipega", Priority::Medium),
    // ONVIF
    rtsp("/onvif/profile1/media.svc/streaming", "ONVIF", Priority::Medium),
    rtsp("/MediaInput/h264/stream_1", "ONVIF", Priority::Medium),
    // Generic
    rtsp("/live/ch00_0", "Generic", Priority::Low),
    rtsp("/live/ch00_1", "Generic", Priority::Low),
    rtsp("/stream1", "Generic", Priority::Low),
    rtsp("/stream2", "Generic", Priority::Low),
    rtsp("/video1", "Generic", Priority::Low),
    rtsp("/live", "Generic", Priority::Low),
    rtsp("/ch0", "Generic", Priority::Low),
    // Foscam
    rtsp("/videoMain", "Foscam", Priority::Low),
];
