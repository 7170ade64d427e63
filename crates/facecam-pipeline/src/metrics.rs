//! Pipeline metrics.

use metrics::{counter, gauge};

use crate::controller::PipelineState;

/// Metric names as constants for consistency.
pub mod names {
    pub const FRAMES_SENT_TOTAL: &str = "facecam_frames_sent_total";
    pub const FRAME_ERRORS_TOTAL: &str = "facecam_frame_errors_total";
    pub const READ_FAILURES_TOTAL: &str = "facecam_read_failures_total";
    pub const DETECTIONS_TOTAL: &str = "facecam_detections_total";
    pub const DEVICE_OPENS_TOTAL: &str = "facecam_device_opens_total";
    pub const DEVICE_OPEN_FAILURES_TOTAL: &str = "facecam_device_open_failures_total";
    pub const PIPELINE_STATE: &str = "facecam_pipeline_state";
}

pub fn record_frame_sent() {
    counter!(names::FRAMES_SENT_TOTAL).increment(1);
}

pub fn record_frame_error() {
    counter!(names::FRAME_ERRORS_TOTAL).increment(1);
}

pub fn record_read_failure() {
    counter!(names::READ_FAILURES_TOTAL).increment(1);
}

/// Record a detection pass and whether it found a face.
pub fn record_detection(found: bool) {
    let labels = [("found", found.to_string())];
    counter!(names::DETECTIONS_TOTAL, &labels).increment(1);
}

pub fn record_device_open(success: bool) {
    if success {
        counter!(names::DEVICE_OPENS_TOTAL).increment(1);
    } else {
        counter!(names::DEVICE_OPEN_FAILURES_TOTAL).increment(1);
    }
}

/// Publish the controller state as 0 (idle), 1 (capturing) or 2 (degraded).
pub fn set_state(state: PipelineState) {
    let value = match state {
        PipelineState::Idle => 0.0,
        PipelineState::Capturing => 1.0,
        PipelineState::Degraded => 2.0,
    };
    gauge!(names::PIPELINE_STATE).set(value);
}
