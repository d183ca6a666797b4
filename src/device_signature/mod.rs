//! Device Signature Registry
//!
//! Maps vendor identifiers observed on a device's web page (ActiveX CLSIDs,
//! plugin installer filenames, brand tokens in URLs) to device-family
//! descriptors: brand, RTSP port, snapshot path and candidate RTSP paths.

mod builtin_data;
mod registry;
mod types;

pub use builtin_data::{BUILTIN_CLSIDS, BRAND_TOKENS, PLUGIN_FILES};
pub use registry::{normalize_identifier, SignatureRegistry};
pub use types::*;
