use super::types::{BuiltinSignature, PluginFile, DEFAULT_RTSP_PORT};

const HIKVISION_SNAPSHOT: &str = "/ISAPI/Streaming/channels/101/picture";
const HIKVISION_RTSP: &[&str] = &["/Streaming/Channels/101", "/h264/ch1/main/av_stream"];

const DAHUA_SNAPSHOT: &str = "/cgi-bin/snapshot.cgi?channel=1";
const DAHUA_RTSP: &[&str] = &["/cam/realmonitor?channel=1&subtype=0", "/live"];

const IPEGA_SNAPSHOT: &str = "/cgi-bin/snapshot.cgi";
const IPEGA_RTSP: &[&str] = &["/profile0", "/profile1", "/11", "/onvif1", "/live/ch00_0"];
// KP-CA series pages only expose the first CLSID group
const IPEGA_KPCA_RTSP: &[&str] = &["/profile0", "/profile1", "/11", "/onvif1"];

/// Known ActiveX CLSIDs of DVR/camera web plugins
/// Key: canonical CLSID (uppercase, unbraced)
pub const BUILTIN_CLSIDS: &[BuiltinSignature] = &[
    // Qualvision / Tecvoz / generic Chinese DVRs
    BuiltinSignature {
        id: "E0DA039D-992F-4187-A105-C699A71F5F06",
        brand: "Qualvision/Tecvoz",
        rtsp_port: DEFAULT_RTSP_PORT,
        snapshot_path: Some("/onvif/device_service"),
        rtsp_paths: &["/live/ch00_0", "/cam/realmonitor?channel=1&subtype=0"],
    },
    // Hikvision
    BuiltinSignature {
        id: "55F88890-DE29-4E36-B13B-E0774CAC9C5A",
        brand: "Hikvision",
        rtsp_port: DEFAULT_RTSP_PORT,
        snapshot_path: Some(HIKVISION_SNAPSHOT),
        rtsp_paths: HIKVISION_RTSP,
    },
    BuiltinSignature {
        id: "6263DEED-F971-4C18-AB42-3ABCDE741A89",
        brand: "Hikvision",
        rtsp_port: DEFAULT_RTSP_PORT,
        snapshot_path: Some(HIKVISION_SNAPSHOT),
        rtsp_paths: HIKVISION_RTSP,
    },
    BuiltinSignature {
        id: "08CF8D24-DA5E-4C0B-B2E3-E72B3C714BAC",
        brand: "Hikvision",
        rtsp_port: DEFAULT_RTSP_PORT,
        snapshot_path: Some(HIKVISION_SNAPSHOT),
        rtsp_paths: HIKVISION_RTSP,
    },
    BuiltinSignature {
        id: "CCAB80D2-5DCF-44FB-9EAE-0F632B758498",
        brand: "Hikvision",
        rtsp_port: DEFAULT_RTSP_PORT,
        snapshot_path: Some(HIKVISION_SNAPSHOT),
        rtsp_paths: HIKVISION_RTSP,
    },
    // Dahua
    BuiltinSignature {
        id: "4B3476C6-3A85-4F86-8418-D1130C952B05",
        brand: "Dahua",
        rtsp_port: DEFAULT_RTSP_PORT,
        snapshot_path: Some(DAHUA_SNAPSHOT),
        rtsp_paths: DAHUA_RTSP,
    },
    BuiltinSignature {
        id: "4B3476C6-3A85-4C2C-BD55-BD8F1E028B00",
        brand: "Dahua",
        rtsp_port: DEFAULT_RTSP_PORT,
        snapshot_path: Some(DAHUA_SNAPSHOT),
        rtsp_paths: DAHUA_RTSP,
    },
    BuiltinSignature {
        id: "39B06C8F-91A7-4CAC-8B94-C8B8F26B1A8C",
        brand: "Dahua",
        rtsp_port: DEFAULT_RTSP_PORT,
        snapshot_path: Some(DAHUA_SNAPSHOT),
        rtsp_paths: DAHUA_RTSP,
    },
    // Ipega DVRs and cameras
    BuiltinSignature {
        id: "B6D5419C-4B84-4C47-ACF6-4E5E0C6C1B7D",
        brand: "Ipega",
        rtsp_port: DEFAULT_RTSP_PORT,
        snapshot_path: Some(IPEGA_SNAPSHOT),
        rtsp_paths: IPEGA_RTSP,
    },
    BuiltinSignature {
        id: "B6D5419C",
        brand: "Ipega",
        rtsp_port: DEFAULT_RTSP_PORT,
        snapshot_path: Some(IPEGA_SNAPSHOT),
        rtsp_paths: IPEGA_KPCA_RTSP,
    },
    BuiltinSignature {
        id: "B6D5419C-D381-4687-9CFC-A9E2CD7008F5",
        brand: "Ipega",
        rtsp_port: DEFAULT_RTSP_PORT,
        snapshot_path: Some(IPEGA_SNAPSHOT),
        rtsp_paths: IPEGA_RTSP,
    },
];

/// Known plugin installer filenames, matched in table order
pub const PLUGIN_FILES: &[PluginFile] = &[
    // Hikvision
    PluginFile { filename: "webcomponents.exe", brand: "Hikvision", rtsp_port: 554, rtsp_path: "/Streaming/Channels/101" },
    PluginFile { filename: "localservicecomponents.exe", brand: "Hikvision", rtsp_port: 554, rtsp_path: "/Streaming/Channels/101" },
    // Dahua
    PluginFile { filename: "webplugin.exe", brand: "Dahua", rtsp_port: 554, rtsp_path: "/cam/realmonitor?channel=1&subtype=0" },
    PluginFile { filename: "dahuaweb.exe", brand: "Dahua", rtsp_port: 554, rtsp_path: "/cam/realmonitor?channel=1&subtype=0" },
    // Intelbras (Dahua OEM)
    PluginFile { filename: "intelbras.exe", brand: "Intelbras", rtsp_port: 554, rtsp_path: "/cam/realmonitor?channel=1&subtype=0" },
    // Qualvision / Tecvoz
    PluginFile { filename: "qualvision.ocx", brand: "Qualvision", rtsp_port: 554, rtsp_path: "/live/ch00_0" },
    PluginFile { filename: "tecvoz.ocx", brand: "Tecvoz", rtsp_port: 554, rtsp_path: "/live/ch00_0" },
    // Generic DVR plugins
    PluginFile { filename: "npplugin.exe", brand: "Generic", rtsp_port: 554, rtsp_path: "/live/ch00_0" },
    PluginFile { filename: "ocx.cab", brand: "ActiveX OCX", rtsp_port: 554, rtsp_path: "/stream1" },
    PluginFile { filename: "activex.cab", brand: "ActiveX", rtsp_port: 554, rtsp_path: "/stream1" },
    PluginFile { filename: "vlcplugin.exe", brand: "VLC Plugin", rtsp_port: 554, rtsp_path: "/stream" },
    // Ipega
    PluginFile { filename: "ipega.ocx", brand: "Ipega", rtsp_port: 554, rtsp_path: "/profile0" },
    PluginFile { filename: "ipega.exe", brand: "Ipega", rtsp_port: 554, rtsp_path: "/profile0" },
    PluginFile { filename: "ipega.cab", brand: "Ipega", rtsp_port: 554, rtsp_path: "/profile0" },
    PluginFile { filename: "hwdvrplugin.ocx", brand: "Ipega", rtsp_port: 554, rtsp_path: "/profile0" },
    PluginFile { filename: "hwdvrplugin.exe", brand: "Ipega", rtsp_port: 554, rtsp_path: "/profile0" },
];

/// Brand tokens searched in the full (lowercased) URL when no filename matched.
/// Value: filename row in `PLUGIN_FILES` used as the descriptor.
pub const BRAND_TOKENS: &[(&str, &str)] = &[
    ("hikvision", "webcomponents.exe"),
    ("hik", "webcomponents.exe"),
    ("dahua", "webplugin.exe"),
    ("intelbras", "intelbras.exe"),
    ("ipega", "ipega.ocx"),
    ("kp-ca", "ipega.ocx"),
];
