//! Router integration tests against an in-memory store and fake cameras.

use std::collections::HashSet;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use facecam_api::{create_router, ApiConfig, AppState};
use facecam_media::{CaptureBackend, CaptureDevice, CaptureHints, MediaError, MediaResult};
use facecam_models::{Orientation, TrackingConfig};
use facecam_store::{ConfigStore, MemoryPersistence};
use serde_json::{json, Value};
use tower::ServiceExt;

struct FakeBackend {
    working: HashSet<i32>,
}

impl CaptureBackend for FakeBackend {
    fn open(&self, index: i32, _hints: Option<&CaptureHints>) -> MediaResult<Box<dyn CaptureDevice>> {
        Err(MediaError::device_open(index, "fake"))
    }

    fn probe(&self, index: i32) -> bool {
        self.working.contains(&index)
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

struct Harness {
    app: Router,
    store: Arc<ConfigStore>,
    persistence: Arc<MemoryPersistence>,
}

fn harness(working: &[i32]) -> Harness {
    let persistence = Arc::new(MemoryPersistence::default());
    let store = Arc::new(ConfigStore::new(persistence.clone(), Some(0)));
    let backend = Arc::new(FakeBackend {
        working: working.iter().copied().collect(),
    });
    let state = AppState::new(ApiConfig::default(), store.clone(), backend);
    Harness {
        app: create_router(state, None),
        store,
        persistence,
    }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let (status, body) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

async fn post_config(app: &Router, body: impl Into<Body>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/api/config")
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap();
    let (status, body) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_health_endpoint() {
    let h = harness(&[]);
    let (status, body) = get_json(&h.app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_index_serves_control_page() {
    let h = harness(&[]);
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let (status, body) = send(&h.app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8(body).unwrap().contains("/api/config"));
}

#[tokio::test]
async fn test_get_config_returns_defaults() {
    let h = harness(&[]);
    let (status, body) = get_json(&h.app, "/api/config").await;
    assert_eq!(status, StatusCode::OK);

    let config: TrackingConfig = serde_json::from_value(body).unwrap();
    assert_eq!(config, TrackingConfig::default());
}

#[tokio::test]
async fn test_partial_update_clamps_and_persists() {
    let h = harness(&[]);
    let (status, body) = post_config(
        &h.app,
        json!({"orientation": "cw", "smoothing_alpha": 0, "margin_factor": "bogus"}).to_string(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let config: TrackingConfig = serde_json::from_value(body).unwrap();
    assert_eq!(config.orientation, Orientation::Clockwise);
    assert_eq!(config.smoothing_alpha, 0.01);
    assert_eq!(config.margin_factor, TrackingConfig::default().margin_factor);
    assert_eq!(config, h.store.get());
    assert_eq!(h.persistence.save_count(), 1);
}

#[tokio::test]
async fn test_malformed_body_is_empty_update() {
    let h = harness(&[]);
    let (status, body) = post_config(&h.app, "{not json").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_value::<TrackingConfig>(body).unwrap(), TrackingConfig::default());
    assert_eq!(h.persistence.save_count(), 0);
}

#[tokio::test]
async fn test_missing_content_type_still_parsed() {
    let h = harness(&[]);
    let request = Request::builder()
        .method("POST")
        .uri("/api/config")
        .body(Body::from(r#"{"detection_interval_frames": 4}"#))
        .unwrap();
    let (status, _) = send(&h.app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(h.store.get().detection_interval_frames, 4);
}

#[tokio::test]
async fn test_reserved_camera_index_rejected() {
    let h = harness(&[]);
    let (_, body) = post_config(&h.app, r#"{"camera_index": 0}"#).await;
    assert_eq!(body["camera_index"], Value::Null);
    assert_eq!(h.store.get().camera_index, None);
}

#[tokio::test]
async fn test_cameras_lists_probed_and_current() {
    let h = harness(&[0, 1, 2]);
    post_config(&h.app, r#"{"camera_index": 5}"#).await;

    let (status, body) = get_json(&h.app, "/api/cameras").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"cameras": [
            {"index": 1, "label": "Camera 1"},
            {"index": 2, "label": "Camera 2"},
            {"index": 5, "label": "Camera 5 (current)"},
        ]})
    );
}

#[tokio::test]
async fn test_metrics_route_absent_when_disabled() {
    let h = harness(&[]);
    let request = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
    let (status, _) = send(&h.app, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
