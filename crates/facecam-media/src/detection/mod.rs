//! Face detection.
//!
//! Detectors return zero or more boxes per frame; the pipeline tracks the
//! largest. When a detector cannot be built the pipeline runs with
//! [`NullDetector`] and keeps emitting centered crops.

#[cfg(feature = "opencv")]
mod haar;
#[cfg(feature = "opencv")]
mod yunet;

#[cfg(feature = "opencv")]
pub use haar::{HaarDetector, HAAR_CASCADE_PATHS};
#[cfg(feature = "opencv")]
pub use yunet::YuNetDetector;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use facecam_models::BoundingBox;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::error::MediaResult;
use crate::estimator::select_dominant;
use crate::frame::Frame;

/// A face detector.
pub trait FaceDetector: Send {
    /// Detect faces in a frame, returning boxes in frame pixel coordinates.
    fn detect(&mut self, frame: &Frame) -> MediaResult<Vec<BoundingBox>>;

    /// Detector name for logging.
    fn name(&self) -> &'static str;
}

/// Detector that never finds a face.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDetector;

impl FaceDetector for NullDetector {
    fn detect(&mut self, _frame: &Frame) -> MediaResult<Vec<BoundingBox>> {
        Ok(Vec::new())
    }

    fn name(&self) -> &'static str {
        "none"
    }
}

/// Available detector implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectorKind {
    /// Frontal face Haar cascade
    #[default]
    Haar,
    /// YuNet CNN via `FaceDetectorYN`
    YuNet,
    /// Detection disabled
    None,
}

impl DetectorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Haar => "haar",
            Self::YuNet => "yunet",
            Self::None => "none",
        }
    }
}

impl fmt::Display for DetectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DetectorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "haar" => Ok(Self::Haar),
            "yunet" => Ok(Self::YuNet),
            "none" | "off" => Ok(Self::None),
            other => Err(format!("unknown detector: {}", other)),
        }
    }
}

/// Model file locations. `None` means search the well-known paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetectorPaths {
    pub cascade: Option<PathBuf>,
    pub yunet_model: Option<PathBuf>,
}

/// Build a detector, falling back to [`NullDetector`] on failure.
pub fn build_detector(kind: DetectorKind, paths: &DetectorPaths) -> Box<dyn FaceDetector> {
    match try_build(kind, paths) {
        Ok(detector) => {
            info!(detector = detector.name(), "Face detector ready");
            detector
        }
        Err(e) => {
            error!(
                detector = %kind,
                error = %e,
                "Face detector unavailable, output will stay centered"
            );
            Box::new(NullDetector)
        }
    }
}

#[cfg(feature = "opencv")]
fn try_build(kind: DetectorKind, paths: &DetectorPaths) -> MediaResult<Box<dyn FaceDetector>> {
    match kind {
        DetectorKind::Haar => Ok(Box::new(HaarDetector::new(paths.cascade.as_deref())?)),
        DetectorKind::YuNet => Ok(Box::new(YuNetDetector::new(paths.yunet_model.as_deref())?)),
        DetectorKind::None => Ok(Box::new(NullDetector)),
    }
}

#[cfg(not(feature = "opencv"))]
fn try_build(kind: DetectorKind, _paths: &DetectorPaths) -> MediaResult<Box<dyn FaceDetector>> {
    match kind {
        DetectorKind::None => Ok(Box::new(NullDetector)),
        _ => Err(crate::error::MediaError::BackendUnavailable(
            "built without the opencv feature".to_string(),
        )),
    }
}

/// Run detection and keep the largest face.
pub fn detect_dominant(
    detector: &mut dyn FaceDetector,
    frame: &Frame,
) -> MediaResult<Option<BoundingBox>> {
    let faces = detector.detect(frame)?;
    Ok(select_dominant(&faces))
}
