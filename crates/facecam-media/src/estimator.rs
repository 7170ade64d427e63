//! Exponentially smoothed face estimate.

use facecam_models::{BoundingBox, FaceEstimate, MIN_SMOOTHING_ALPHA};

/// Largest-area valid box, if any. Ties keep the first.
pub fn select_dominant(faces: &[BoundingBox]) -> Option<BoundingBox> {
    faces
        .iter()
        .filter(|b| b.is_valid())
        .fold(None, |best: Option<BoundingBox>, b| match best {
            Some(current) if current.area() >= b.area() => Some(current),
            _ => Some(*b),
        })
}

/// Whether detection runs on this frame.
///
/// `frame_index` counts from 1 after each (re)open; an interval of 0 is
/// treated as 1.
pub fn should_detect(frame_index: u64, interval: u32) -> bool {
    frame_index % u64::from(interval.max(1)) == 0
}

/// Blend a detection into the previous estimate.
///
/// Without a previous estimate the detection is taken as-is. `alpha` is
/// clamped into `[0.01, 1.0]`; NaN falls back to the minimum.
pub fn update_estimate(
    previous: Option<&FaceEstimate>,
    detection: &BoundingBox,
    alpha: f64,
) -> FaceEstimate {
    let sample = FaceEstimate::from_box(detection);
    match previous {
        None => sample,
        Some(prev) => {
            let alpha = if alpha.is_nan() {
                MIN_SMOOTHING_ALPHA
            } else {
                alpha.clamp(MIN_SMOOTHING_ALPHA, 1.0)
            };
            prev.blend(&sample, alpha)
        }
    }
}

/// Holds the current estimate between frames.
#[derive(Debug, Clone, Default)]
pub struct FaceEstimator {
    estimate: Option<FaceEstimate>,
}

impl FaceEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a detection into the estimate and return it.
    pub fn observe(&mut self, detection: &BoundingBox, alpha: f64) -> FaceEstimate {
        let next = update_estimate(self.estimate.as_ref(), detection, alpha);
        self.estimate = Some(next);
        next
    }

    /// Forget the estimate.
    pub fn reset(&mut self) {
        self.estimate = None;
    }

    pub fn estimate(&self) -> Option<&FaceEstimate> {
        self.estimate.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(cx: f64, cy: f64, size: f64) -> BoundingBox {
        BoundingBox::new(cx - size / 2.0, cy - size / 2.0, size, size)
    }

    #[test]
    fn test_select_dominant_by_area() {
        let faces = [
            BoundingBox::new(0.0, 0.0, 10.0, 50.0),
            BoundingBox::new(0.0, 0.0, 30.0, 30.0),
            BoundingBox::new(0.0, 0.0, 20.0, 20.0),
        ];
        assert_eq!(select_dominant(&faces), Some(faces[1]));
        assert_eq!(select_dominant(&[]), None);
    }

    #[test]
    fn test_select_dominant_ignores_invalid() {
        let faces = [
            BoundingBox::new(0.0, 0.0, f64::NAN, 500.0),
            BoundingBox::new(0.0, 0.0, 5.0, 5.0),
        ];
        assert_eq!(select_dominant(&faces), Some(faces[1]));
    }

    #[test]
    fn test_should_detect_gating() {
        let hits: Vec<u64> = (1..=30).filter(|i| should_detect(*i, 10)).collect();
        assert_eq!(hits, vec![10, 20, 30]);
        assert!((1..=5).all(|i| should_detect(i, 1)));
        assert!(should_detect(7, 0));
    }

    #[test]
    fn test_first_detection_taken_raw() {
        let bbox = BoundingBox::new(100.0, 50.0, 80.0, 120.0);
        let estimate = update_estimate(None, &bbox, 0.02);
        assert_eq!(estimate, FaceEstimate::new(140.0, 110.0, 120.0));
    }

    #[test]
    fn test_blend_formula() {
        let prev = FaceEstimate::new(100.0, 100.0, 100.0);
        let next = update_estimate(Some(&prev), &square(200.0, 100.0, 200.0), 0.5);
        assert_eq!(next, FaceEstimate::new(150.0, 100.0, 150.0));
    }

    #[test]
    fn test_alpha_is_clamped() {
        let prev = FaceEstimate::new(0.0, 0.0, 100.0);
        let target = square(100.0, 0.0, 100.0);

        let low = update_estimate(Some(&prev), &target, -3.0);
        assert!((low.center_x - 1.0).abs() < 1e-9);

        let high = update_estimate(Some(&prev), &target, 7.0);
        assert!((high.center_x - 100.0).abs() < 1e-9);

        let nan = update_estimate(Some(&prev), &target, f64::NAN);
        assert!((nan.center_x - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_converges_monotonically() {
        let mut estimator = FaceEstimator::new();
        estimator.observe(&square(0.0, 0.0, 80.0), 0.2);

        let target = square(300.0, 200.0, 120.0);
        let goal = FaceEstimate::from_box(&target);
        let mut last = f64::INFINITY;
        for _ in 0..50 {
            let distance = estimator.observe(&target, 0.2).center_distance(&goal);
            assert!(distance < last);
            last = distance;
        }
    }

    #[test]
    fn test_reset_forgets() {
        let mut estimator = FaceEstimator::new();
        estimator.observe(&square(10.0, 10.0, 10.0), 0.5);
        assert!(estimator.estimate().is_some());
        estimator.reset();
        assert!(estimator.estimate().is_none());

        let fresh = estimator.observe(&square(50.0, 60.0, 20.0), 0.5);
        assert_eq!(fresh, FaceEstimate::new(50.0, 60.0, 20.0));
    }
}
