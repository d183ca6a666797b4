//! DVR Resolver Library
//!
//! Identifies legacy DVR/NVR devices from the ActiveX plugins their web
//! pages request, and resolves a working snapshot/MJPEG or RTSP endpoint
//! without running the vendor plugin.
//!
//! ## Architecture (5 Components)
//!
//! 1. DeviceSignature - CLSID/filename registry with runtime learning
//! 2. PageSignal - CLSID and plugin-link extraction from markup
//! 3. CandidateSynth - prioritized candidate URL synthesis
//! 4. ProbeEngine - sequential, time-bounded candidate validation
//! 5. Resolver - orchestration and the vendor observation stream
//!
//! ## Design Principles
//!
//! - Resolution never fails: unknown devices degrade to generic candidates
//! - Devices are probed one request at a time
//! - Credentials never appear in logs

pub mod candidate_synth;
pub mod device_signature;
pub mod page_signal;
pub mod playback_hint;
pub mod probe_engine;
pub mod resolver;
pub mod error;
pub mod state;

pub use error::{Error, Result};
pub use state::{AppConfig, AppState};
