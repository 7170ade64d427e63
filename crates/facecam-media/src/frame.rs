//! Owned 8-bit, 3-channel frames.
//!
//! Capture delivers `Bgr` frames; the output sink expects `Rgb`. All
//! geometric operations are channel-order agnostic and keep the layout tag.

use facecam_models::{CropRegion, Orientation};
use image::imageops::{self, FilterType};
use image::{ImageBuffer, Rgb};

use crate::error::{MediaError, MediaResult};

/// Channel order of a [`Frame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelLayout {
    /// Blue, green, red (OpenCV capture order)
    Bgr,
    /// Red, green, blue (consumer-facing order)
    Rgb,
}

/// Tightly packed image buffer.
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    layout: PixelLayout,
    data: Vec<u8>,
}

type Buffer = ImageBuffer<Rgb<u8>, Vec<u8>>;

impl Frame {
    /// Wrap raw pixel data, validating its length.
    pub fn new(width: u32, height: u32, layout: PixelLayout, data: Vec<u8>) -> MediaResult<Self> {
        let expected = width as usize * height as usize * 3;
        if data.len() != expected {
            return Err(MediaError::invalid_frame(format!(
                "{}x{} frame needs {} bytes, got {}",
                width,
                height,
                expected,
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            layout,
            data,
        })
    }

    /// Frame filled with a single color, given in the frame's own channel order.
    pub fn filled(width: u32, height: u32, layout: PixelLayout, pixel: [u8; 3]) -> Self {
        let data = pixel
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 3)
            .collect();
        Self {
            width,
            height,
            layout,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)`
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn layout(&self) -> PixelLayout {
        self.layout
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// True when the frame has no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Pixel at `(x, y)` in the frame's channel order.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 3;
        Some([self.data[offset], self.data[offset + 1], self.data[offset + 2]])
    }

    /// Apply the configured rotation.
    pub fn rotated(self, orientation: Orientation) -> Self {
        let rotated = match orientation {
            Orientation::None => return self,
            Orientation::Clockwise => imageops::rotate90(&self.to_buffer()),
            Orientation::CounterClockwise => imageops::rotate270(&self.to_buffer()),
        };
        Self::from_buffer(rotated, self.layout)
    }

    /// Copy out a square region. The region must lie within the frame.
    pub fn crop(&self, region: &CropRegion) -> MediaResult<Self> {
        if !region.fits_within(self.width, self.height) {
            return Err(MediaError::invalid_frame(format!(
                "crop {:?} outside {}x{} frame",
                region, self.width, self.height
            )));
        }

        let (x, y, size) = (region.x as u32, region.y as u32, region.size as u32);
        let row_bytes = size as usize * 3;
        let mut data = Vec::with_capacity(row_bytes * size as usize);
        for row in y..y + size {
            let start = (row as usize * self.width as usize + x as usize) * 3;
            data.extend_from_slice(&self.data[start..start + row_bytes]);
        }

        Ok(Self {
            width: size,
            height: size,
            layout: self.layout,
            data,
        })
    }

    /// Resize with bilinear filtering.
    pub fn resized(&self, width: u32, height: u32) -> Self {
        if (width, height) == (self.width, self.height) {
            return self.clone();
        }
        let resized = imageops::resize(&self.to_buffer(), width, height, FilterType::Triangle);
        Self::from_buffer(resized, self.layout)
    }

    /// Convert to RGB channel order, swapping channels if needed.
    pub fn into_rgb(mut self) -> Self {
        if self.layout == PixelLayout::Bgr {
            for px in self.data.chunks_exact_mut(3) {
                px.swap(0, 2);
            }
            self.layout = PixelLayout::Rgb;
        }
        self
    }

    /// Convert to BGR channel order, swapping channels if needed.
    pub fn into_bgr(mut self) -> Self {
        if self.layout == PixelLayout::Rgb {
            for px in self.data.chunks_exact_mut(3) {
                px.swap(0, 2);
            }
            self.layout = PixelLayout::Bgr;
        }
        self
    }

    fn to_buffer(&self) -> Buffer {
        // Length is validated on construction.
        ImageBuffer::from_raw(self.width, self.height, self.data.clone())
            .unwrap_or_else(|| ImageBuffer::new(self.width, self.height))
    }

    fn from_buffer(buffer: Buffer, layout: PixelLayout) -> Self {
        let (width, height) = buffer.dimensions();
        Self {
            width,
            height,
            layout,
            data: buffer.into_raw(),
        }
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("layout", &self.layout)
            .finish()
    }
}

#[cfg(feature = "opencv")]
mod mat {
    use opencv::core::{Mat, Scalar, CV_8UC3};
    use opencv::prelude::*;

    use super::{Frame, PixelLayout};
    use crate::error::{MediaError, MediaResult};

    impl Frame {
        /// Copy an 8-bit 3-channel OpenCV matrix.
        pub fn from_mat(mat: &Mat, layout: PixelLayout) -> MediaResult<Self> {
            if mat.empty() {
                return Err(MediaError::invalid_frame("empty matrix"));
            }
            if mat.typ() != CV_8UC3 {
                return Err(MediaError::invalid_frame(format!(
                    "unsupported matrix type {}",
                    mat.typ()
                )));
            }

            let width = mat.cols() as u32;
            let height = mat.rows() as u32;
            let data = if mat.is_continuous() {
                mat.data_bytes()?.to_vec()
            } else {
                mat.try_clone()?.data_bytes()?.to_vec()
            };
            Frame::new(width, height, layout, data)
        }

        /// Copy into a new 8-bit 3-channel OpenCV matrix.
        pub fn to_mat(&self) -> MediaResult<Mat> {
            let mut mat = Mat::new_rows_cols_with_default(
                self.height as i32,
                self.width as i32,
                CV_8UC3,
                Scalar::all(0.0),
            )?;
            mat.data_bytes_mut()?.copy_from_slice(self.data());
            Ok(mat)
        }
    }
}
