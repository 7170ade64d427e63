//! Capture backends.
//!
//! A [`CaptureBackend`] opens numbered inputs; the returned [`CaptureDevice`]
//! owns the handle and releases it on drop. Only one device is held at a
//! time by the pipeline, so switching inputs is "drop the old, open the new".

use std::sync::Arc;

use tracing::debug;

use crate::error::MediaResult;
use crate::frame::Frame;

/// Requested capture format. Backends treat these as hints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureHints {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
}

impl Default for CaptureHints {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            fps: 30.0,
        }
    }
}

/// An open capture input.
pub trait CaptureDevice: Send {
    /// Index this device was opened with.
    fn index(&self) -> i32;

    /// Read the next frame.
    ///
    /// `Ok(None)` means the device is still open but produced no frame.
    fn read_frame(&mut self) -> MediaResult<Option<Frame>>;
}

/// Factory for capture devices.
pub trait CaptureBackend: Send + Sync {
    /// Open the input at `index`, applying `hints` when given.
    fn open(&self, index: i32, hints: Option<&CaptureHints>) -> MediaResult<Box<dyn CaptureDevice>>;

    /// Whether the input at `index` opens and yields a frame.
    ///
    /// The probe handle is released before returning.
    fn probe(&self, index: i32) -> bool {
        match self.open(index, None) {
            Ok(mut device) => matches!(device.read_frame(), Ok(Some(_))),
            Err(e) => {
                debug!(index, error = %e, "Probe failed");
                false
            }
        }
    }

    /// Backend name for logging.
    fn name(&self) -> &'static str;
}

/// The platform capture backend.
pub fn default_backend() -> Arc<dyn CaptureBackend> {
    #[cfg(feature = "opencv")]
    {
        Arc::new(opencv_backend::OpenCvBackend)
    }
    #[cfg(not(feature = "opencv"))]
    {
        Arc::new(UnavailableBackend)
    }
}

/// Backend used when no capture library is compiled in.
#[cfg(not(feature = "opencv"))]
#[derive(Debug, Default)]
pub struct UnavailableBackend;

#[cfg(not(feature = "opencv"))]
impl CaptureBackend for UnavailableBackend {
    fn open(&self, _index: i32, _hints: Option<&CaptureHints>) -> MediaResult<Box<dyn CaptureDevice>> {
        Err(crate::error::MediaError::BackendUnavailable(
            "built without the opencv feature".to_string(),
        ))
    }

    fn probe(&self, _index: i32) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "unavailable"
    }
}

#[cfg(feature = "opencv")]
pub use opencv_backend::{OpenCvBackend, OpenCvCamera};

#[cfg(feature = "opencv")]
mod opencv_backend {
    use opencv::core::Mat;
    use opencv::prelude::*;
    use opencv::videoio::{
        VideoCapture, CAP_ANY, CAP_PROP_FPS, CAP_PROP_FRAME_HEIGHT, CAP_PROP_FRAME_WIDTH,
    };
    use tracing::{debug, warn};

    use super::{CaptureBackend, CaptureDevice, CaptureHints};
    use crate::error::{MediaError, MediaResult};
    use crate::frame::{Frame, PixelLayout};

    /// OpenCV `VideoCapture` backend.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct OpenCvBackend;

    impl CaptureBackend for OpenCvBackend {
        fn open(
            &self,
            index: i32,
            hints: Option<&CaptureHints>,
        ) -> MediaResult<Box<dyn CaptureDevice>> {
            let mut capture = VideoCapture::new(index, CAP_ANY)
                .map_err(|e| MediaError::device_open(index, e.to_string()))?;
            if !capture.is_opened().unwrap_or(false) {
                return Err(MediaError::device_open(index, "device did not open"));
            }

            if let Some(hints) = hints {
                for (prop, value, name) in [
                    (CAP_PROP_FRAME_WIDTH, hints.width as f64, "width"),
                    (CAP_PROP_FRAME_HEIGHT, hints.height as f64, "height"),
                    (CAP_PROP_FPS, hints.fps, "fps"),
                ] {
                    // Drivers are free to ignore these.
                    if let Err(e) = capture.set(prop, value) {
                        warn!(index, property = name, error = %e, "Capture hint rejected");
                    }
                }
            }

            debug!(index, "Opened capture device");
            Ok(Box::new(OpenCvCamera {
                index,
                capture,
                buffer: Mat::default(),
            }))
        }

        fn name(&self) -> &'static str {
            "opencv"
        }
    }

    /// An open OpenCV capture handle.
    pub struct OpenCvCamera {
        index: i32,
        capture: VideoCapture,
        buffer: Mat,
    }

    impl CaptureDevice for OpenCvCamera {
        fn index(&self) -> i32 {
            self.index
        }

        fn read_frame(&mut self) -> MediaResult<Option<Frame>> {
            let grabbed = self
                .capture
                .read(&mut self.buffer)
                .map_err(|e| MediaError::frame_read(self.index, e.to_string()))?;
            if !grabbed || self.buffer.empty() {
                return Ok(None);
            }
            Frame::from_mat(&self.buffer, PixelLayout::Bgr).map(Some)
        }
    }

    impl Drop for OpenCvCamera {
        fn drop(&mut self) {
            if let Err(e) = self.capture.release() {
                warn!(index = self.index, error = %e, "Failed to release capture device");
            } else {
                debug!(index = self.index, "Released capture device");
            }
        }
    }
}
