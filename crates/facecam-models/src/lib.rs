//! Shared data models for FaceCam.
//!
//! This crate provides Serde-serializable types for:
//! - Runtime tracking configuration and partial updates
//! - Frame orientation
//! - Face bounding boxes, smoothed estimates and crop regions
//! - Camera listings exposed by the control surface

pub mod camera;
pub mod face;
pub mod orientation;
pub mod rect;
pub mod tracking;

// Re-export common types
pub use camera::{CameraEntry, CameraList};
pub use face::FaceEstimate;
pub use orientation::{Orientation, OrientationParseError};
pub use rect::{BoundingBox, CropRegion};
pub use tracking::{
    ConfigUpdate, TrackingConfig, DEFAULT_DETECTION_INTERVAL, DEFAULT_MARGIN_FACTOR,
    DEFAULT_SMOOTHING_ALPHA, MIN_DETECTION_INTERVAL, MIN_MARGIN_FACTOR, MIN_SMOOTHING_ALPHA,
};
