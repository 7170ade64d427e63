//! Smoothed face position and size.

use serde::{Deserialize, Serialize};

use crate::rect::BoundingBox;

/// Exponentially smoothed face estimate in frame pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceEstimate {
    /// Smoothed face center x
    pub center_x: f64,
    /// Smoothed face center y
    pub center_y: f64,
    /// Smoothed face size (largest side of the detection box)
    pub size: f64,
}

impl FaceEstimate {
    /// Create a new estimate.
    pub fn new(center_x: f64, center_y: f64, size: f64) -> Self {
        Self {
            center_x,
            center_y,
            size,
        }
    }

    /// Raw estimate taken directly from a detection box.
    pub fn from_box(bbox: &BoundingBox) -> Self {
        Self::new(bbox.cx(), bbox.cy(), bbox.max_side())
    }

    /// Blend a new sample into this estimate: `alpha * sample + (1 - alpha) * self`.
    pub fn blend(&self, sample: &FaceEstimate, alpha: f64) -> Self {
        let mix = |old: f64, new: f64| alpha * new + (1.0 - alpha) * old;
        Self {
            center_x: mix(self.center_x, sample.center_x),
            center_y: mix(self.center_y, sample.center_y),
            size: mix(self.size, sample.size),
        }
    }

    /// Euclidean distance between the two centers.
    pub fn center_distance(&self, other: &FaceEstimate) -> f64 {
        (self.center_x - other.center_x).hypot(self.center_y - other.center_y)
    }

    /// Whether every component is finite.
    pub fn is_finite(&self) -> bool {
        self.center_x.is_finite() && self.center_y.is_finite() && self.size.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_box_uses_center_and_largest_side() {
        let estimate = FaceEstimate::from_box(&BoundingBox::new(10.0, 20.0, 40.0, 60.0));
        assert_eq!(estimate, FaceEstimate::new(30.0, 50.0, 60.0));
    }

    #[test]
    fn test_blend_weights_new_sample_by_alpha() {
        let old = FaceEstimate::new(100.0, 100.0, 50.0);
        let new = FaceEstimate::new(200.0, 0.0, 150.0);
        let blended = old.blend(&new, 0.25);
        assert!((blended.center_x - 125.0).abs() < 1e-9);
        assert!((blended.center_y - 75.0).abs() < 1e-9);
        assert!((blended.size - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_blend_with_alpha_one_replaces() {
        let old = FaceEstimate::new(1.0, 2.0, 3.0);
        let new = FaceEstimate::new(4.0, 5.0, 6.0);
        assert_eq!(old.blend(&new, 1.0), new);
    }
}
