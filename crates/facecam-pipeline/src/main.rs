//! FaceCam service binary.
//!
//! Runs the frame pipeline on a dedicated thread and the control surface on
//! the tokio runtime. The two share only the configuration store.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use tracing::{error, info, warn};

use facecam_api::{create_router, metrics, AppState};
use facecam_media::{build_detector, default_backend, open_default_sink};
use facecam_pipeline::controller::{self, PipelineController};
use facecam_pipeline::{logging, FacecamConfig};
use facecam_store::{ConfigStore, JsonFilePersistence};

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = FacecamConfig::from_env();
    logging::init_tracing(config.log_file.as_deref());

    info!("Starting facecam");
    info!(?config, "Service config");

    let store = Arc::new(ConfigStore::load(
        JsonFilePersistence::new(&config.config_path),
        config.reserved_index,
    ));
    info!(tracking = ?store.get(), "Tracking config loaded");

    // The virtual camera is required; nothing else is.
    let sink = match open_default_sink(&config.output) {
        Ok(sink) => sink,
        Err(e) => {
            error!(error = %e, "Failed to open virtual camera output");
            std::process::exit(1);
        }
    };

    // Installed before the pipeline thread records its first open.
    let metrics_handle = if config.api.metrics_enabled {
        match metrics::init_metrics() {
            Ok(handle) => {
                info!("Prometheus metrics enabled at /metrics");
                Some(handle)
            }
            Err(e) => {
                warn!(error = %e, "Failed to install metrics recorder");
                None
            }
        }
    } else {
        None
    };

    let backend = default_backend();
    let detector = build_detector(config.detector, &config.detector_paths);

    let shutdown = Arc::new(AtomicBool::new(false));
    let pipeline = PipelineController::new(
        Arc::clone(&store),
        Arc::clone(&backend),
        detector,
        sink,
        config.pipeline_settings(),
    );
    let pipeline_handle = match controller::spawn(pipeline, Arc::clone(&shutdown)) {
        Ok(handle) => handle,
        Err(e) => {
            error!(error = %e, "Failed to start pipeline thread");
            std::process::exit(1);
        }
    };

    let state = AppState::new(config.api.clone(), store, backend);
    let app = create_router(state, metrics_handle);

    let exit_code = match serve(app, &config.api.bind_address(), Arc::clone(&shutdown)).await {
        Ok(()) => 0,
        Err(e) => {
            error!("Control surface failed: {:#}", e);
            1
        }
    };

    stop_pipeline(&shutdown, pipeline_handle).await;
    info!("Shutdown complete");
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

/// Serve the control surface until Ctrl-C, then raise the shutdown flag.
async fn serve(app: Router, addr: &str, shutdown: Arc<AtomicBool>) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Control surface listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
            info!("Received shutdown signal");
            shutdown.store(true, Ordering::Relaxed);
        })
        .await
        .context("control surface stopped unexpectedly")
}

async fn stop_pipeline(shutdown: &AtomicBool, handle: std::thread::JoinHandle<()>) {
    shutdown.store(true, Ordering::Relaxed);
    match tokio::task::spawn_blocking(move || handle.join()).await {
        Ok(Ok(())) => {}
        Ok(Err(_)) => error!("Pipeline thread panicked"),
        Err(e) => error!(error = %e, "Failed to join pipeline thread"),
    }
}
