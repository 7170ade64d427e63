//! Application state.

use std::sync::Arc;

use facecam_media::CaptureBackend;
use facecam_store::ConfigStore;

use crate::config::ApiConfig;

/// Shared application state.
///
/// The store is the only state shared with the pipeline thread.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub store: Arc<ConfigStore>,
    pub backend: Arc<dyn CaptureBackend>,
}

impl AppState {
    pub fn new(config: ApiConfig, store: Arc<ConfigStore>, backend: Arc<dyn CaptureBackend>) -> Self {
        Self {
            config,
            store,
            backend,
        }
    }
}
