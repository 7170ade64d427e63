//! Virtual camera output.
//!
//! The sink takes fixed-size RGB frames. [`FramePacer`] holds the pipeline to
//! the configured frame rate.

#[cfg(target_os = "linux")]
mod v4l2;

#[cfg(target_os = "linux")]
pub use v4l2::V4l2LoopbackSink;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::MediaResult;
use crate::frame::Frame;

/// Loopback device used when none is configured.
pub const DEFAULT_OUTPUT_DEVICE: &str = "/dev/video0";

/// Output stream format.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSettings {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    /// Loopback device node. `None` selects [`DEFAULT_OUTPUT_DEVICE`].
    pub device: Option<PathBuf>,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            width: 640,
            height: 640,
            fps: 30,
            device: None,
        }
    }
}

impl OutputSettings {
    pub fn device_path(&self) -> PathBuf {
        self.device
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DEVICE))
    }

    /// Interval between frames.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.fps.max(1)))
    }
}

/// Consumer of processed frames.
pub trait OutputSink: Send {
    /// Emit one frame. The frame must match the sink's size and be RGB.
    fn send(&mut self, frame: &Frame) -> MediaResult<()>;

    /// Block until the next frame is due.
    fn wait_next_frame(&mut self);

    /// Human-readable sink description.
    fn describe(&self) -> String;
}

/// Open the platform virtual camera.
#[cfg(target_os = "linux")]
pub fn open_default_sink(settings: &OutputSettings) -> MediaResult<Box<dyn OutputSink>> {
    Ok(Box::new(V4l2LoopbackSink::open(settings)?))
}

/// Open the platform virtual camera.
#[cfg(not(target_os = "linux"))]
pub fn open_default_sink(_settings: &OutputSettings) -> MediaResult<Box<dyn OutputSink>> {
    Err(crate::error::MediaError::UnsupportedPlatform)
}

/// Deadline-based frame pacing.
///
/// Each call to [`FramePacer::wait`] sleeps until one interval past the
/// previous deadline. If the caller has fallen more than one interval
/// behind, the schedule restarts from now instead of bursting to catch up.
#[derive(Debug)]
pub struct FramePacer {
    interval: Duration,
    next_deadline: Option<Instant>,
    window_start: Instant,
    window_frames: u32,
}

/// Frames between measured-rate log lines.
const RATE_WINDOW: u32 = 300;

impl FramePacer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_deadline: None,
            window_start: Instant::now(),
            window_frames: 0,
        }
    }

    /// Sleep until the next frame slot.
    pub fn wait(&mut self) {
        let now = Instant::now();
        let deadline = match self.next_deadline {
            Some(d) if d + self.interval >= now => d,
            _ => now,
        };
        if deadline > now {
            std::thread::sleep(deadline - now);
        }
        self.next_deadline = Some(deadline + self.interval);
        self.record_frame();
    }

    fn record_frame(&mut self) {
        self.window_frames += 1;
        if self.window_frames >= RATE_WINDOW {
            let elapsed = self.window_start.elapsed().as_secs_f64();
            if elapsed > 0.0 {
                debug!(fps = self.window_frames as f64 / elapsed, "Output frame rate");
            }
            self.window_start = Instant::now();
            self.window_frames = 0;
        }
    }
}
