//! Tracing setup for the service binary.
//!
//! Console output is colored for development, JSON when `LOG_FORMAT=json`.
//! A plain-text copy goes to the log file when one is configured.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing::warn;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Open `path` for appending, creating it and its parent directory.
pub fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Install the global subscriber.
///
/// A log file that cannot be opened is reported once the console layer is
/// up; logging continues to the console only.
pub fn init_tracing(log_file: Option<&Path>) {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    // `facecam` prefixes every crate target in the workspace.
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("facecam=info"));

    let console_layer = if use_json {
        fmt::layer().json().boxed()
    } else {
        fmt::layer()
            .with_ansi(true)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .boxed()
    };

    let mut open_error = None;
    let file_layer = log_file.and_then(|path| match open_log_file(path) {
        Ok(file) => Some(
            fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(Mutex::new(file)),
        ),
        Err(e) => {
            open_error = Some((path.display().to_string(), e));
            None
        }
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    if let Some((path, e)) = open_error {
        warn!(path = %path, error = %e, "Failed to open log file, logging to console only");
    }
}
