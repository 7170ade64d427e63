#![deny(unreachable_patterns)]
//! Capture, face tracking and virtual camera output for FaceCam.
//!
//! This crate provides:
//! - Owned frames with rotation, crop, resize and color conversion
//! - Capture backends (OpenCV `VideoCapture`) and input enumeration
//! - Face detectors (Haar cascade, YuNet) with a no-op fallback
//! - EMA face estimation and square crop planning
//! - Virtual camera output (V4L2 loopback) with frame pacing

pub mod capture;
pub mod crop_planner;
pub mod detection;
pub mod devices;
pub mod error;
pub mod estimator;
pub mod frame;
pub mod output;

pub use capture::{default_backend, CaptureBackend, CaptureDevice, CaptureHints};
pub use crop_planner::{CropPlanner, DEFAULT_MIN_CROP_SIZE};
pub use detection::{
    build_detector, detect_dominant, DetectorKind, DetectorPaths, FaceDetector, NullDetector,
};
pub use devices::{default_reserved_index, enumerate_inputs, DEFAULT_MAX_PROBE_INDEX};
pub use error::{MediaError, MediaResult};
pub use estimator::{select_dominant, should_detect, update_estimate, FaceEstimator};
pub use frame::{Frame, PixelLayout};
pub use output::{open_default_sink, FramePacer, OutputSettings, OutputSink};
