//! YuNet CNN face detector via OpenCV's `FaceDetectorYN`.
//!
//! Requires OpenCV 4.5+ with the DNN module. The 2023mar models need 4.8+.

use std::path::{Path, PathBuf};

use facecam_models::BoundingBox;
use opencv::core::{Mat, Ptr, Size};
use opencv::dnn::{DNN_BACKEND_DEFAULT, DNN_BACKEND_OPENCV, DNN_TARGET_CPU};
use opencv::objdetect::FaceDetectorYN;
use opencv::prelude::*;
use tracing::{debug, info, warn};

use super::FaceDetector;
use crate::error::{MediaError, MediaResult};
use crate::frame::Frame;

/// Model locations searched when no path is configured, in preference order.
const YUNET_MODEL_PATHS: &[&str] = &[
    "./models/face_detection_yunet_2023mar.onnx",
    "./models/face_detection_yunet_2022mar.onnx",
    "/usr/share/opencv4/models/face_detection_yunet_2023mar.onnx",
    "/usr/share/opencv/models/face_detection_yunet_2023mar.onnx",
    "/usr/share/opencv/models/face_detection_yunet_2022mar.onnx",
];

const SCORE_THRESHOLD: f32 = 0.6;
const NMS_THRESHOLD: f32 = 0.3;
const TOP_K: i32 = 5;

/// Columns per YuNet output row: box, five landmarks, score.
const OUTPUT_COLUMNS: i32 = 15;

/// YuNet detector. The input size follows the frame size.
pub struct YuNetDetector {
    detector: Ptr<FaceDetectorYN>,
    input_size: (i32, i32),
}

impl YuNetDetector {
    pub fn new(model: Option<&Path>) -> MediaResult<Self> {
        let path = match model {
            Some(p) => p.to_path_buf(),
            None => YUNET_MODEL_PATHS
                .iter()
                .map(PathBuf::from)
                .find(|p| p.exists())
                .ok_or_else(|| MediaError::ModelNotFound("face_detection_yunet".to_string()))?,
        };
        if !path.exists() {
            return Err(MediaError::ModelNotFound(path.display().to_string()));
        }

        let detector = create_with_fallback(&path.to_string_lossy())?;
        info!(model = %path.display(), "YuNet detector initialized");

        Ok(Self {
            detector,
            input_size: (0, 0),
        })
    }
}

fn create_with_fallback(model_path: &str) -> MediaResult<Ptr<FaceDetectorYN>> {
    let mut last_error = String::new();

    for (backend_id, target_id, backend_name) in [
        (DNN_BACKEND_DEFAULT, DNN_TARGET_CPU, "default"),
        (DNN_BACKEND_OPENCV, DNN_TARGET_CPU, "opencv"),
    ] {
        match FaceDetectorYN::create(
            model_path,
            "",
            Size::new(320, 320),
            SCORE_THRESHOLD,
            NMS_THRESHOLD,
            TOP_K,
            backend_id,
            target_id,
        ) {
            Ok(detector) => {
                debug!(backend = backend_name, "YuNet created");
                return Ok(detector);
            }
            Err(e) => {
                warn!(backend = backend_name, error = %e, "YuNet backend failed");
                last_error = e.to_string();
            }
        }
    }

    Err(MediaError::detection_failed(format!(
        "failed to create YuNet detector with any backend: {}",
        last_error
    )))
}

impl FaceDetector for YuNetDetector {
    fn detect(&mut self, frame: &Frame) -> MediaResult<Vec<BoundingBox>> {
        if frame.is_empty() {
            return Ok(Vec::new());
        }

        // YuNet expects BGR input.
        let mat = frame.clone().into_bgr().to_mat()?;
        let size = (frame.width() as i32, frame.height() as i32);
        if size != self.input_size {
            self.detector.set_input_size(Size::new(size.0, size.1))?;
            self.input_size = size;
        }

        let mut faces = Mat::default();
        self.detector.detect(&mat, &mut faces)?;
        if faces.rows() <= 0 {
            return Ok(Vec::new());
        }
        if faces.cols() < OUTPUT_COLUMNS {
            warn!(columns = faces.cols(), "Unexpected YuNet output shape");
            return Ok(Vec::new());
        }

        let (frame_w, frame_h) = (frame.width() as f64, frame.height() as f64);
        let mut boxes = Vec::with_capacity(faces.rows() as usize);
        for row in 0..faces.rows() {
            let x = *faces.at_2d::<f32>(row, 0)? as f64;
            let y = *faces.at_2d::<f32>(row, 1)? as f64;
            let w = *faces.at_2d::<f32>(row, 2)? as f64;
            let h = *faces.at_2d::<f32>(row, 3)? as f64;

            // Clip to the frame; boxes may extend past the edges.
            let x0 = x.max(0.0);
            let y0 = y.max(0.0);
            let x1 = (x + w).min(frame_w);
            let y1 = (y + h).min(frame_h);
            let bbox = BoundingBox::new(x0, y0, x1 - x0, y1 - y0);
            if bbox.is_valid() {
                boxes.push(bbox);
            }
        }
        Ok(boxes)
    }

    fn name(&self) -> &'static str {
        "yunet"
    }
}
