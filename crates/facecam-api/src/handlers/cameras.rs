//! Capture input listing.

use axum::extract::State;
use axum::Json;
use facecam_media::enumerate_inputs;
use facecam_models::CameraList;

use crate::error::ApiResult;
use crate::metrics;
use crate::state::AppState;

/// List selectable capture inputs, marking the current one.
pub async fn list_cameras(State(state): State<AppState>) -> ApiResult<Json<CameraList>> {
    let current = state.store.get().camera_index;
    let reserved = state.store.reserved_index();
    let max_index = state.config.max_probe_index;
    let backend = state.backend.clone();

    // Probing opens devices and blocks.
    let indices = tokio::task::spawn_blocking(move || {
        enumerate_inputs(backend.as_ref(), max_index, reserved, current)
    })
    .await?;

    metrics::record_cameras_listed(indices.len());
    Ok(Json(CameraList::from_indices(&indices, current)))
}
