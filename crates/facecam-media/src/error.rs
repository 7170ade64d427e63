//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while capturing, tracking or emitting frames.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Failed to open capture device {index}: {message}")]
    DeviceOpen { index: i32, message: String },

    #[error("Failed to read frame from capture device {index}: {message}")]
    FrameRead { index: i32, message: String },

    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    #[error("Face detection failed: {0}")]
    DetectionFailed(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Failed to initialize output sink {device}: {message}")]
    SinkInit { device: PathBuf, message: String },

    #[error("Failed to write frame to output sink: {0}")]
    SinkWrite(String),

    #[error("Virtual camera output is not supported on this platform")]
    UnsupportedPlatform,

    #[error("Capture backend unavailable: {0}")]
    BackendUnavailable(String),

    #[cfg(feature = "opencv")]
    #[error("OpenCV error: {0}")]
    OpenCv(#[from] opencv::Error),
}

impl MediaError {
    /// Create a device open error.
    pub fn device_open(index: i32, message: impl Into<String>) -> Self {
        Self::DeviceOpen {
            index,
            message: message.into(),
        }
    }

    /// Create a frame read error.
    pub fn frame_read(index: i32, message: impl Into<String>) -> Self {
        Self::FrameRead {
            index,
            message: message.into(),
        }
    }

    /// Create an invalid frame error.
    pub fn invalid_frame(message: impl Into<String>) -> Self {
        Self::InvalidFrame(message.into())
    }

    /// Create a detection failure error.
    pub fn detection_failed(message: impl Into<String>) -> Self {
        Self::DetectionFailed(message.into())
    }

    /// Create a sink initialization error.
    pub fn sink_init(device: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::SinkInit {
            device: device.into(),
            message: message.into(),
        }
    }
}
