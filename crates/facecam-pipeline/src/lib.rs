//! FaceCam frame pipeline.
//!
//! The controller owns the capture device and the output sink and runs on
//! its own thread. It shares nothing with the control surface except the
//! configuration store.

pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod metrics;

pub use config::FacecamConfig;
pub use controller::{PipelineController, PipelineSettings, PipelineState, StepOutcome};
pub use error::{PipelineError, PipelineResult};
