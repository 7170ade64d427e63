//! Runtime tracking configuration shared by the pipeline and the control surface.

use serde::{Deserialize, Serialize};

use crate::orientation::Orientation;

/// Default detection interval (frames).
pub const DEFAULT_DETECTION_INTERVAL: u32 = 10;

/// Default EMA weight of the newest detection.
pub const DEFAULT_SMOOTHING_ALPHA: f64 = 0.02;

/// Default crop size multiplier.
pub const DEFAULT_MARGIN_FACTOR: f64 = 2.8;

/// Smallest detection interval.
pub const MIN_DETECTION_INTERVAL: u32 = 1;

/// Value substituted for non-positive smoothing weights.
pub const MIN_SMOOTHING_ALPHA: f64 = 0.01;

/// Smallest margin factor.
pub const MIN_MARGIN_FACTOR: f64 = 1.0;

/// Snapshot of the runtime tracking configuration.
///
/// Every field always holds a valid value; partial changes go through
/// [`ConfigUpdate`] and [`TrackingConfig::apply`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Selected physical input; `None` until the user picks one
    pub camera_index: Option<i32>,
    /// Rotation applied after capture
    pub orientation: Orientation,
    /// Run detection every Nth captured frame
    #[serde(alias = "detection_every_n_frames")]
    pub detection_interval_frames: u32,
    /// EMA weight given to the newest detection
    pub smoothing_alpha: f64,
    /// Multiplier applied to the face size to get the crop size
    pub margin_factor: f64,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            camera_index: None,
            orientation: Orientation::None,
            detection_interval_frames: DEFAULT_DETECTION_INTERVAL,
            smoothing_alpha: DEFAULT_SMOOTHING_ALPHA,
            margin_factor: DEFAULT_MARGIN_FACTOR,
        }
    }
}

impl TrackingConfig {
    /// Apply the fields present in `update`, coercing values into range.
    ///
    /// Returns the names of the fields that were applied. Non-finite
    /// floats are skipped.
    pub fn apply(&mut self, update: &ConfigUpdate) -> Vec<&'static str> {
        let mut applied = Vec::new();

        if let Some(index) = update.camera_index {
            self.camera_index = Some(index);
            applied.push("camera_index");
        }
        if let Some(orientation) = update.orientation {
            self.orientation = orientation;
            applied.push("orientation");
        }
        if let Some(interval) = update.detection_interval_frames {
            self.detection_interval_frames = interval.max(MIN_DETECTION_INTERVAL);
            applied.push("detection_interval_frames");
        }
        if let Some(alpha) = update.smoothing_alpha.filter(|a| a.is_finite()) {
            self.smoothing_alpha = if alpha <= 0.0 { MIN_SMOOTHING_ALPHA } else { alpha };
            applied.push("smoothing_alpha");
        }
        if let Some(margin) = update.margin_factor.filter(|m| m.is_finite()) {
            self.margin_factor = margin.max(MIN_MARGIN_FACTOR);
            applied.push("margin_factor");
        }

        applied
    }
}

/// Partial configuration update; each `Some` field is a requested change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera_index: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<Orientation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detection_interval_frames: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smoothing_alpha: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin_factor: Option<f64>,
}

impl ConfigUpdate {
    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.camera_index.is_none()
            && self.orientation.is_none()
            && self.detection_interval_frames.is_none()
            && self.smoothing_alpha.is_none()
            && self.margin_factor.is_none()
    }
}
