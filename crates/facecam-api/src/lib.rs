//! Axum control surface.
//!
//! This crate provides:
//! - Read and partial update of the runtime tracking configuration
//! - Capture input enumeration
//! - The browser control page
//! - Health and Prometheus metrics endpoints

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
