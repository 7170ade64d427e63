//! Rectangles in frame pixel coordinates.

use serde::{Deserialize, Serialize};

/// Bounding box in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge x-coordinate
    pub x: f64,
    /// Top edge y-coordinate
    pub y: f64,
    /// Box width
    pub width: f64,
    /// Box height
    pub height: f64,
}

impl BoundingBox {
    /// Create a new bounding box.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Center x-coordinate.
    #[inline]
    pub fn cx(&self) -> f64 {
        self.x + self.width / 2.0
    }

    /// Center y-coordinate.
    #[inline]
    pub fn cy(&self) -> f64 {
        self.y + self.height / 2.0
    }

    /// Box area in pixels.
    #[inline]
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Largest side, used as the face size.
    #[inline]
    pub fn max_side(&self) -> f64 {
        self.width.max(self.height)
    }

    /// Whether the box has a positive, finite extent.
    pub fn is_valid(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0
    }
}

/// Square crop region in integer pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CropRegion {
    /// Left edge
    pub x: i32,
    /// Top edge
    pub y: i32,
    /// Side length
    pub size: i32,
}

impl CropRegion {
    /// Create a new crop region.
    pub fn new(x: i32, y: i32, size: i32) -> Self {
        Self { x, y, size }
    }

    /// Centered square of side `min(width, height)`.
    pub fn centered(width: u32, height: u32) -> Self {
        let side = width.min(height);
        Self {
            x: ((width - side) / 2) as i32,
            y: ((height - side) / 2) as i32,
            size: side as i32,
        }
    }

    /// Whether the region is non-empty and lies fully within `[0, width) x [0, height)`.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        let (width, height) = (i64::from(width), i64::from(height));
        let (x, y, size) = (i64::from(self.x), i64::from(self.y), i64::from(self.size));
        size > 0 && x >= 0 && y >= 0 && x + size <= width && y + size <= height
    }
}
