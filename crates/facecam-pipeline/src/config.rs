//! Process configuration.
//!
//! Everything here is fixed for the life of the process. Runtime tracking
//! parameters live in the configuration store instead.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use facecam_api::ApiConfig;
use facecam_media::{
    default_reserved_index, CaptureHints, DetectorKind, DetectorPaths, OutputSettings,
    DEFAULT_MIN_CROP_SIZE,
};

use crate::controller::PipelineSettings;

/// Service configuration.
#[derive(Debug, Clone)]
pub struct FacecamConfig {
    /// Control surface settings
    pub api: ApiConfig,
    /// Durable tracking configuration file
    pub config_path: PathBuf,
    /// Virtual camera format and device
    pub output: OutputSettings,
    /// Requested capture format
    pub capture: CaptureHints,
    /// Capture index that is the virtual camera itself
    pub reserved_index: Option<i32>,
    /// Smallest crop side for a tracked face
    pub min_crop_size: u32,
    /// Face detector implementation
    pub detector: DetectorKind,
    /// Detector model files
    pub detector_paths: DetectorPaths,
    /// Sleep while no camera is selected
    pub idle_backoff: Duration,
    /// Sleep after a failed device open
    pub open_backoff: Duration,
    /// Sleep after a failed frame read or frame error
    pub read_backoff: Duration,
    /// Plain-text copy of the log, if any
    pub log_file: Option<PathBuf>,
}

impl Default for FacecamConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            config_path: PathBuf::from("facecam_config.json"),
            output: OutputSettings::default(),
            capture: CaptureHints::default(),
            reserved_index: default_reserved_index(),
            min_crop_size: DEFAULT_MIN_CROP_SIZE,
            detector: DetectorKind::default(),
            detector_paths: DetectorPaths::default(),
            idle_backoff: Duration::from_millis(100),
            open_backoff: Duration::from_secs(1),
            read_backoff: Duration::from_millis(50),
            log_file: Some(PathBuf::from("facecam.log")),
        }
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

fn env_millis(key: &str, default: Duration) -> Duration {
    env_parse::<u64>(key)
        .map(Duration::from_millis)
        .unwrap_or(default)
}

/// `none`/`off`/empty disables the log file; anything else is a path.
fn parse_log_file(value: &str) -> Option<PathBuf> {
    match value.trim() {
        v if v.is_empty() || v.eq_ignore_ascii_case("none") || v.eq_ignore_ascii_case("off") => {
            None
        }
        v => Some(PathBuf::from(v)),
    }
}

/// `none`/`off`/empty disables the reserved index; an integer sets it.
fn parse_reserved(value: &str) -> Option<Option<i32>> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "none" | "off" => Some(None),
        other => other.parse().ok().map(Some),
    }
}

impl FacecamConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api: ApiConfig::from_env(),
            config_path: std::env::var("FACECAM_CONFIG_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.config_path),
            output: OutputSettings {
                width: env_parse("FACECAM_OUTPUT_WIDTH").unwrap_or(defaults.output.width),
                height: env_parse("FACECAM_OUTPUT_HEIGHT").unwrap_or(defaults.output.height),
                fps: env_parse("FACECAM_OUTPUT_FPS").unwrap_or(defaults.output.fps),
                device: std::env::var("FACECAM_OUTPUT_DEVICE").ok().map(PathBuf::from),
            },
            capture: CaptureHints {
                width: env_parse("FACECAM_CAPTURE_WIDTH").unwrap_or(defaults.capture.width),
                height: env_parse("FACECAM_CAPTURE_HEIGHT").unwrap_or(defaults.capture.height),
                fps: env_parse("FACECAM_CAPTURE_FPS").unwrap_or(defaults.capture.fps),
            },
            reserved_index: std::env::var("FACECAM_RESERVED_INDEX")
                .ok()
                .and_then(|v| parse_reserved(&v))
                .unwrap_or(defaults.reserved_index),
            min_crop_size: env_parse("FACECAM_MIN_CROP_SIZE").unwrap_or(defaults.min_crop_size),
            detector: env_parse("FACECAM_DETECTOR").unwrap_or(defaults.detector),
            detector_paths: DetectorPaths {
                cascade: std::env::var("FACECAM_CASCADE_PATH").ok().map(PathBuf::from),
                yunet_model: std::env::var("FACECAM_YUNET_MODEL").ok().map(PathBuf::from),
            },
            idle_backoff: env_millis("FACECAM_IDLE_BACKOFF_MS", defaults.idle_backoff),
            open_backoff: env_millis("FACECAM_OPEN_BACKOFF_MS", defaults.open_backoff),
            read_backoff: env_millis("FACECAM_READ_BACKOFF_MS", defaults.read_backoff),
            log_file: std::env::var("FACECAM_LOG_FILE")
                .map(|v| parse_log_file(&v))
                .unwrap_or(defaults.log_file),
        }
    }

    /// Controller settings derived from this configuration.
    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            output_width: self.output.width,
            output_height: self.output.height,
            min_crop_size: self.min_crop_size,
            capture_hints: self.capture,
            idle_backoff: self.idle_backoff,
            open_backoff: self.open_backoff,
            read_backoff: self.read_backoff,
        }
    }
}
