//! Square crop planning.
//!
//! The planner only ever shifts a square to keep it inside the frame; it
//! never shrinks one axis, so the output resize is always 1:1 in aspect.

use facecam_models::{CropRegion, FaceEstimate};
use tracing::warn;

/// Smallest crop side the planner emits for a tracked face.
pub const DEFAULT_MIN_CROP_SIZE: u32 = 50;

/// Turns a face estimate into an in-frame square.
#[derive(Debug, Clone, Copy)]
pub struct CropPlanner {
    min_size: u32,
}

impl Default for CropPlanner {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_CROP_SIZE)
    }
}

impl CropPlanner {
    pub fn new(min_size: u32) -> Self {
        Self {
            min_size: min_size.max(1),
        }
    }

    /// Plan the crop for a `width` x `height` frame.
    ///
    /// Without an estimate (or with a non-finite one) the result is the
    /// centered square of side `min(width, height)`. Frames smaller than the
    /// minimum crop side also get the centered square.
    pub fn plan(
        &self,
        width: u32,
        height: u32,
        estimate: Option<&FaceEstimate>,
        margin_factor: f64,
    ) -> CropRegion {
        let centered = CropRegion::centered(width, height);
        let max_side = width.min(height);

        let estimate = match estimate {
            Some(e) if e.is_finite() && margin_factor.is_finite() => e,
            _ => return centered,
        };
        if max_side < self.min_size {
            return centered;
        }

        let desired = (estimate.size * margin_factor).round();
        let size = desired.clamp(self.min_size as f64, max_side as f64) as i64;
        let half = size as f64 / 2.0;

        let x = clamp_axis((estimate.center_x - half).round(), size, width);
        let y = clamp_axis((estimate.center_y - half).round(), size, height);
        let region = CropRegion::new(x as i32, y as i32, size as i32);

        if region.fits_within(width, height) {
            region
        } else {
            warn!(?region, width, height, "Planned crop out of bounds, using centered crop");
            centered
        }
    }
}

/// Shift a start coordinate so `[start, start + size)` lies in `[0, extent)`.
fn clamp_axis(start: f64, size: i64, extent: u32) -> i64 {
    let max_start = (i64::from(extent) - size).max(0);
    (start as i64).clamp(0, max_start)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn est(cx: f64, cy: f64, size: f64) -> FaceEstimate {
        FaceEstimate::new(cx, cy, size)
    }

    #[test]
    fn test_absent_estimate_is_centered() {
        let planner = CropPlanner::default();
        assert_eq!(planner.plan(640, 480, None, 2.8), CropRegion::new(80, 0, 480));
        assert_eq!(planner.plan(480, 640, None, 2.8), CropRegion::new(0, 80, 480));
        assert_eq!(planner.plan(31, 31, None, 2.8), CropRegion::new(0, 0, 31));
    }

    #[test]
    fn test_centered_face_scenario() {
        let planner = CropPlanner::default();
        let region = planner.plan(640, 480, Some(&est(320.0, 240.0, 100.0)), 2.8);
        assert_eq!(region, CropRegion::new(180, 100, 280));
    }

    #[test]
    fn test_size_clamped_to_frame() {
        let planner = CropPlanner::default();
        let region = planner.plan(640, 480, Some(&est(320.0, 240.0, 400.0)), 2.8);
        assert_eq!(region, CropRegion::new(80, 0, 480));
    }

    #[test]
    fn test_size_floored_at_minimum() {
        let planner = CropPlanner::default();
        let region = planner.plan(640, 480, Some(&est(320.0, 240.0, 5.0)), 1.0);
        assert_eq!(region, CropRegion::new(295, 215, 50));
    }

    #[test]
    fn test_edge_face_is_shifted_not_shrunk() {
        let planner = CropPlanner::default();
        let region = planner.plan(640, 480, Some(&est(630.0, 5.0, 100.0)), 2.0);
        assert_eq!(region, CropRegion::new(440, 0, 200));
    }

    #[test]
    fn test_non_finite_estimate_is_centered() {
        let planner = CropPlanner::default();
        let centered = CropRegion::centered(640, 480);
        assert_eq!(planner.plan(640, 480, Some(&est(f64::NAN, 0.0, 10.0)), 2.8), centered);
        assert_eq!(planner.plan(640, 480, Some(&est(0.0, 0.0, f64::INFINITY)), 2.8), centered);
        assert_eq!(planner.plan(640, 480, Some(&est(0.0, 0.0, 10.0)), f64::NAN), centered);
    }

    #[test]
    fn test_tiny_frame_is_centered() {
        let planner = CropPlanner::default();
        let region = planner.plan(40, 30, Some(&est(20.0, 15.0, 10.0)), 2.0);
        assert_eq!(region, CropRegion::new(5, 0, 30));
    }

    #[test]
    fn test_region_always_square_and_in_bounds() {
        let planner = CropPlanner::default();
        let dims = [(640, 480), (480, 640), (50, 50), (1920, 1080), (51, 300)];
        let centers = [-500.0, 0.0, 25.0, 333.3, 1000.0, 5000.0];
        let sizes = [0.0, 1.0, 37.5, 120.0, 900.0, 1e9];
        let margins = [1.0, 2.8, 10.0];

        for &(w, h) in &dims {
            for &cx in &centers {
                for &cy in &centers {
                    for &size in &sizes {
                        for &margin in &margins {
                            let e = est(cx, cy, size);
                            let region = planner.plan(w, h, Some(&e), margin);
                            assert!(region.fits_within(w, h), "{:?} in {}x{}", region, w, h);
                            assert!(region.size >= DEFAULT_MIN_CROP_SIZE as i32);
                            assert!(region.size <= w.min(h) as i32);
                        }
                    }
                }
            }
        }
    }
}
