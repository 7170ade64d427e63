//! Tracking configuration handlers.

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use facecam_models::TrackingConfig;
use serde_json::Value;
use tracing::debug;

use crate::error::ApiResult;
use crate::state::AppState;

/// Current configuration snapshot.
pub async fn get_config(State(state): State<AppState>) -> Json<TrackingConfig> {
    Json(state.store.get())
}

/// Apply a partial update and return the resulting snapshot.
///
/// The body is read as raw bytes so a missing content type or malformed
/// JSON is treated as an empty update rather than rejected.
pub async fn update_config(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<TrackingConfig>> {
    let payload = match serde_json::from_slice::<Value>(&body) {
        Ok(value) => value,
        Err(e) => {
            debug!(error = %e, "Config body is not JSON, treating as empty update");
            Value::Null
        }
    };

    // Persisting writes to disk.
    let store = state.store.clone();
    let snapshot = tokio::task::spawn_blocking(move || store.update_from_json(&payload)).await?;
    Ok(Json(snapshot))
}
