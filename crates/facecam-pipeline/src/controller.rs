//! Pipeline controller.
//!
//! One [`PipelineController::step`] is one loop iteration: reconcile the
//! held capture device with the configured camera, then read, track, crop
//! and emit a single frame. [`PipelineController::run`] repeats it until
//! shutdown.
//!
//! The estimate and the frame counter are reset whenever the camera
//! changes or the device is reopened. An orientation change resets the
//! estimate only.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use facecam_media::{
    detect_dominant, should_detect, CaptureBackend, CaptureDevice, CaptureHints, CropPlanner,
    FaceDetector, FaceEstimator, Frame, OutputSink, DEFAULT_MIN_CROP_SIZE,
};
use facecam_models::{FaceEstimate, Orientation, TrackingConfig};
use facecam_store::ConfigStore;
use tracing::{debug, error, info, trace, warn};

use crate::error::PipelineResult;
use crate::metrics;

/// Controller lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// No camera selected
    Idle,
    /// A capture device is open
    Capturing,
    /// The selected camera failed to open; retried after a backoff
    Degraded,
}

/// What a single [`PipelineController::step`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// No camera selected
    Idle,
    /// The camera at this index was opened
    Opened(i32),
    /// The camera at this index failed to open
    OpenFailed(i32),
    /// A frame was emitted
    FrameSent,
    /// The device produced no frame
    ReadFailed,
    /// A frame was read but could not be processed or emitted
    FrameError,
}

/// Fixed controller parameters.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub output_width: u32,
    pub output_height: u32,
    pub min_crop_size: u32,
    pub capture_hints: CaptureHints,
    pub idle_backoff: Duration,
    pub open_backoff: Duration,
    pub read_backoff: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            output_width: 640,
            output_height: 640,
            min_crop_size: DEFAULT_MIN_CROP_SIZE,
            capture_hints: CaptureHints::default(),
            idle_backoff: Duration::from_millis(100),
            open_backoff: Duration::from_secs(1),
            read_backoff: Duration::from_millis(50),
        }
    }
}

/// Owns the capture device and output sink for the life of the pipeline.
pub struct PipelineController {
    store: Arc<ConfigStore>,
    backend: Arc<dyn CaptureBackend>,
    detector: Box<dyn FaceDetector>,
    sink: Box<dyn OutputSink>,
    planner: CropPlanner,
    settings: PipelineSettings,

    device: Option<Box<dyn CaptureDevice>>,
    target_index: Option<i32>,
    state: PipelineState,
    frame_index: u64,
    estimator: FaceEstimator,
    last_orientation: Option<Orientation>,
}

impl PipelineController {
    pub fn new(
        store: Arc<ConfigStore>,
        backend: Arc<dyn CaptureBackend>,
        detector: Box<dyn FaceDetector>,
        sink: Box<dyn OutputSink>,
        settings: PipelineSettings,
    ) -> Self {
        info!(
            backend = backend.name(),
            detector = detector.name(),
            sink = %sink.describe(),
            "Pipeline controller created"
        );
        Self {
            store,
            backend,
            detector,
            sink,
            planner: CropPlanner::new(settings.min_crop_size),
            settings,
            device: None,
            target_index: None,
            state: PipelineState::Idle,
            frame_index: 0,
            estimator: FaceEstimator::new(),
            last_orientation: None,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Frames read since the device was last (re)opened.
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    pub fn estimate(&self) -> Option<&FaceEstimate> {
        self.estimator.estimate()
    }

    /// Camera the controller is trying to hold.
    pub fn target_index(&self) -> Option<i32> {
        self.target_index
    }

    /// Whether a capture device is currently held.
    pub fn has_device(&self) -> bool {
        self.device.is_some()
    }

    /// Loop until `shutdown` is set, then release the capture device.
    pub fn run(&mut self, shutdown: &AtomicBool) {
        info!("Pipeline started");
        while !shutdown.load(Ordering::Relaxed) {
            self.step();
        }
        self.release_device();
        info!("Pipeline stopped");
    }

    /// Run one loop iteration.
    pub fn step(&mut self) -> StepOutcome {
        let config = self.store.get();

        if config.camera_index != self.target_index {
            return self.switch_camera(config.camera_index);
        }

        match self.state {
            PipelineState::Idle => {
                std::thread::sleep(self.settings.idle_backoff);
                StepOutcome::Idle
            }
            PipelineState::Degraded => match self.target_index {
                Some(index) => self.open(index),
                None => self.switch_camera(None),
            },
            PipelineState::Capturing => self.capture_once(&config),
        }
    }

    fn switch_camera(&mut self, index: Option<i32>) -> StepOutcome {
        info!(from = ?self.target_index, to = ?index, "Camera selection changed");
        self.release_device();
        self.reset_tracking();
        self.target_index = index;

        match index {
            Some(index) => self.open(index),
            None => {
                self.set_state(PipelineState::Idle);
                std::thread::sleep(self.settings.idle_backoff);
                StepOutcome::Idle
            }
        }
    }

    fn open(&mut self, index: i32) -> StepOutcome {
        match self.backend.open(index, Some(&self.settings.capture_hints)) {
            Ok(device) => {
                info!(index, "Camera opened");
                metrics::record_device_open(true);
                self.device = Some(device);
                self.reset_tracking();
                self.set_state(PipelineState::Capturing);
                StepOutcome::Opened(index)
            }
            Err(e) => {
                warn!(
                    index,
                    error = %e,
                    retry_in_ms = self.settings.open_backoff.as_millis() as u64,
                    "Failed to open camera"
                );
                metrics::record_device_open(false);
                self.set_state(PipelineState::Degraded);
                std::thread::sleep(self.settings.open_backoff);
                StepOutcome::OpenFailed(index)
            }
        }
    }

    fn capture_once(&mut self, config: &TrackingConfig) -> StepOutcome {
        let Some(device) = self.device.as_mut() else {
            // Reopened on the next step.
            self.set_state(PipelineState::Degraded);
            return StepOutcome::ReadFailed;
        };

        let frame = match device.read_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                debug!(index = device.index(), "No frame from camera");
                return self.read_failed();
            }
            Err(e) => {
                warn!(index = device.index(), error = %e, "Frame read failed");
                return self.read_failed();
            }
        };

        match self.process_frame(frame, config) {
            Ok(()) => {
                metrics::record_frame_sent();
                self.sink.wait_next_frame();
                StepOutcome::FrameSent
            }
            Err(e) => {
                error!(frame = self.frame_index, error = %e, "Frame processing failed");
                metrics::record_frame_error();
                std::thread::sleep(self.settings.read_backoff);
                StepOutcome::FrameError
            }
        }
    }

    fn read_failed(&mut self) -> StepOutcome {
        metrics::record_read_failure();
        std::thread::sleep(self.settings.read_backoff);
        StepOutcome::ReadFailed
    }

    /// Rotate, track, crop, resize and emit one captured frame.
    pub fn process_frame(&mut self, frame: Frame, config: &TrackingConfig) -> PipelineResult<()> {
        self.frame_index += 1;

        if self.last_orientation != Some(config.orientation) {
            if self.last_orientation.is_some() {
                info!(orientation = %config.orientation, "Orientation changed, resetting face estimate");
            }
            self.estimator.reset();
            self.last_orientation = Some(config.orientation);
        }

        let frame = frame.rotated(config.orientation);

        if should_detect(self.frame_index, config.detection_interval_frames) {
            match detect_dominant(self.detector.as_mut(), &frame) {
                Ok(Some(face)) => {
                    metrics::record_detection(true);
                    let estimate = self.estimator.observe(&face, config.smoothing_alpha);
                    trace!(frame = self.frame_index, ?face, ?estimate, "Face detected");
                }
                Ok(None) => {
                    metrics::record_detection(false);
                    trace!(frame = self.frame_index, "No face detected");
                }
                Err(e) => {
                    debug!(frame = self.frame_index, error = %e, "Detection failed, keeping estimate");
                }
            }
        }

        let region = self.planner.plan(
            frame.width(),
            frame.height(),
            self.estimator.estimate(),
            config.margin_factor,
        );

        let output = frame
            .crop(&region)?
            .resized(self.settings.output_width, self.settings.output_height)
            .into_rgb();
        self.sink.send(&output)?;
        Ok(())
    }

    fn reset_tracking(&mut self) {
        self.estimator.reset();
        self.frame_index = 0;
        self.last_orientation = None;
    }

    fn release_device(&mut self) {
        if let Some(device) = self.device.take() {
            let index = device.index();
            drop(device);
            info!(index, "Camera released");
        }
    }

    fn set_state(&mut self, state: PipelineState) {
        if self.state != state {
            debug!(from = ?self.state, to = ?state, "Pipeline state changed");
            self.state = state;
        }
        metrics::set_state(state);
    }
}

impl Drop for PipelineController {
    fn drop(&mut self) {
        self.release_device();
    }
}

/// Spawn the controller on a dedicated thread named `pipeline`.
pub fn spawn(
    mut controller: PipelineController,
    shutdown: Arc<AtomicBool>,
) -> std::io::Result<std::thread::JoinHandle<()>> {
    std::thread::Builder::new()
        .name("pipeline".to_string())
        .spawn(move || controller.run(&shutdown))
}
