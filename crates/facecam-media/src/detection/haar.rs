//! Haar cascade frontal face detector.

use std::path::{Path, PathBuf};

use facecam_models::BoundingBox;
use opencv::core::{Mat, Rect, Size, Vector};
use opencv::imgproc::{self, COLOR_BGR2GRAY, COLOR_RGB2GRAY};
use opencv::objdetect::CascadeClassifier;
use opencv::prelude::*;
use tracing::debug;

use super::FaceDetector;
use crate::error::{MediaError, MediaResult};
use crate::frame::{Frame, PixelLayout};

/// Cascade locations searched when no path is configured.
pub const HAAR_CASCADE_PATHS: &[&str] = &[
    "/usr/share/opencv4/haarcascades/haarcascade_frontalface_default.xml",
    "/usr/share/opencv/haarcascades/haarcascade_frontalface_default.xml",
    "/usr/local/share/opencv4/haarcascades/haarcascade_frontalface_default.xml",
    "/opt/homebrew/share/opencv4/haarcascades/haarcascade_frontalface_default.xml",
    "./models/haarcascade_frontalface_default.xml",
];

const SCALE_FACTOR: f64 = 1.3;
const MIN_NEIGHBORS: i32 = 5;
const MIN_FACE_SIZE: i32 = 60;

/// OpenCV `CascadeClassifier` over grayscale frames.
pub struct HaarDetector {
    classifier: CascadeClassifier,
    gray: Mat,
}

impl HaarDetector {
    /// Load the cascade from `path`, or the first well-known path that exists.
    pub fn new(path: Option<&Path>) -> MediaResult<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => find_cascade().ok_or_else(|| {
                MediaError::ModelNotFound("haarcascade_frontalface_default.xml".to_string())
            })?,
        };
        if !path.exists() {
            return Err(MediaError::ModelNotFound(path.display().to_string()));
        }

        let classifier = CascadeClassifier::new(&path.to_string_lossy())?;
        if classifier.empty()? {
            return Err(MediaError::detection_failed(format!(
                "cascade at {} is empty",
                path.display()
            )));
        }

        debug!(path = %path.display(), "Loaded Haar cascade");
        Ok(Self {
            classifier,
            gray: Mat::default(),
        })
    }
}

fn find_cascade() -> Option<PathBuf> {
    HAAR_CASCADE_PATHS
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
}

impl FaceDetector for HaarDetector {
    fn detect(&mut self, frame: &Frame) -> MediaResult<Vec<BoundingBox>> {
        if frame.is_empty() {
            return Ok(Vec::new());
        }

        let mat = frame.to_mat()?;
        let code = match frame.layout() {
            PixelLayout::Bgr => COLOR_BGR2GRAY,
            PixelLayout::Rgb => COLOR_RGB2GRAY,
        };
        imgproc::cvt_color_def(&mat, &mut self.gray, code)?;

        let mut faces = Vector::<Rect>::new();
        self.classifier.detect_multi_scale(
            &self.gray,
            &mut faces,
            SCALE_FACTOR,
            MIN_NEIGHBORS,
            0,
            Size::new(MIN_FACE_SIZE, MIN_FACE_SIZE),
            Size::default(),
        )?;

        Ok(faces
            .iter()
            .map(|r| BoundingBox::new(r.x as f64, r.y as f64, r.width as f64, r.height as f64))
            .filter(BoundingBox::is_valid)
            .collect())
    }

    fn name(&self) -> &'static str {
        "haar"
    }
}
