//! V4L2 loopback sink.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use tracing::info;
use v4l::format::FourCC;
use v4l::video::Output;
use v4l::Device;

use super::{FramePacer, OutputSettings, OutputSink};
use crate::error::{MediaError, MediaResult};
use crate::frame::{Frame, PixelLayout};

/// Writes packed RGB24 frames to a v4l2loopback device node.
pub struct V4l2LoopbackSink {
    path: PathBuf,
    // Holds the negotiated format for the lifetime of the sink.
    _device: Device,
    writer: File,
    width: u32,
    height: u32,
    pacer: FramePacer,
}

impl V4l2LoopbackSink {
    pub fn open(settings: &OutputSettings) -> MediaResult<Self> {
        let path = settings.device_path();

        let device = Device::with_path(&path)
            .map_err(|e| MediaError::sink_init(&path, e.to_string()))?;
        let mut format = Output::format(&device)
            .map_err(|e| MediaError::sink_init(&path, e.to_string()))?;
        format.width = settings.width;
        format.height = settings.height;
        format.fourcc = FourCC::new(b"RGB3");
        format.stride = settings.width * 3;
        format.size = settings.width * settings.height * 3;
        let applied = Output::set_format(&device, &format)
            .map_err(|e| MediaError::sink_init(&path, e.to_string()))?;

        if applied.width != settings.width
            || applied.height != settings.height
            || applied.fourcc != FourCC::new(b"RGB3")
        {
            return Err(MediaError::sink_init(
                &path,
                format!(
                    "device negotiated {}x{} {} instead of {}x{} RGB3",
                    applied.width, applied.height, applied.fourcc, settings.width, settings.height
                ),
            ));
        }

        let writer = OpenOptions::new()
            .write(true)
            .open(&path)
            .map_err(|e| MediaError::sink_init(&path, e.to_string()))?;

        info!(
            device = %path.display(),
            width = settings.width,
            height = settings.height,
            fps = settings.fps,
            "Virtual camera opened"
        );

        Ok(Self {
            path,
            _device: device,
            writer,
            width: settings.width,
            height: settings.height,
            pacer: FramePacer::new(settings.frame_interval()),
        })
    }
}

impl OutputSink for V4l2LoopbackSink {
    fn send(&mut self, frame: &Frame) -> MediaResult<()> {
        if frame.dimensions() != (self.width, self.height) || frame.layout() != PixelLayout::Rgb {
            return Err(MediaError::invalid_frame(format!(
                "sink expects {}x{} RGB, got {:?}",
                self.width, self.height, frame
            )));
        }
        self.writer
            .write_all(frame.data())
            .map_err(|e| MediaError::SinkWrite(e.to_string()))
    }

    fn wait_next_frame(&mut self) {
        self.pacer.wait();
    }

    fn describe(&self) -> String {
        format!("v4l2loopback {} ({}x{})", self.path.display(), self.width, self.height)
    }
}
