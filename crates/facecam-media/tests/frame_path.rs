//! End-to-end frame geometry: rotate, plan, crop, resize, convert.

use facecam_media::{CropPlanner, DetectorKind, FaceEstimator, Frame, PixelLayout};
use facecam_models::{BoundingBox, Orientation};

/// 640x480 BGR frame with a bright 100x100 patch centered at (400, 200).
fn frame_with_patch() -> Frame {
    let (w, h) = (640u32, 480u32);
    let mut data = Vec::with_capacity((w * h * 3) as usize);
    for y in 0..h {
        for x in 0..w {
            let inside = (350..450).contains(&x) && (150..250).contains(&y);
            data.extend_from_slice(if inside { &[0u8, 0, 255] } else { &[10u8, 10, 10] });
        }
    }
    Frame::new(w, h, PixelLayout::Bgr, data).unwrap()
}

#[test]
fn crop_follows_tracked_face() {
    let frame = frame_with_patch();
    let mut estimator = FaceEstimator::new();
    let estimate = estimator.observe(&BoundingBox::new(350.0, 150.0, 100.0, 100.0), 0.02);

    let region = CropPlanner::default().plan(frame.width(), frame.height(), Some(&estimate), 1.2);
    assert_eq!((region.x, region.y, region.size), (340, 140, 120));

    let output = frame.crop(&region).unwrap().resized(640, 640).into_rgb();
    assert_eq!(output.dimensions(), (640, 640));
    assert_eq!(output.layout(), PixelLayout::Rgb);
    // Patch is red in RGB order after conversion.
    assert_eq!(output.pixel(320, 320), Some([255, 0, 0]));
    assert_eq!(output.data().len(), 640 * 640 * 3);
}

#[test]
fn rotation_changes_planning_dimensions() {
    let frame = frame_with_patch().rotated(Orientation::Clockwise);
    assert_eq!(frame.dimensions(), (480, 640));

    let region = CropPlanner::default().plan(frame.width(), frame.height(), None, 2.8);
    assert_eq!((region.x, region.y, region.size), (0, 80, 480));
    assert!(frame.crop(&region).is_ok());
}

#[test]
fn detector_kind_serializes_lowercase() {
    assert_eq!(serde_json::to_string(&DetectorKind::YuNet).unwrap(), "\"yunet\"");
    let kind: DetectorKind = serde_json::from_str("\"haar\"").unwrap();
    assert_eq!(kind, DetectorKind::Haar);
}
