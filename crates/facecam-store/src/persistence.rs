//! Durable storage for the tracking configuration.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use facecam_models::TrackingConfig;
use serde_json::Value;
use tempfile::NamedTempFile;

use crate::error::{StoreError, StoreResult};

/// Keyed-record storage for the configuration.
///
/// `load` returns the raw record so the store can merge it field by field
/// over defaults; `save` always writes the full record.
pub trait ConfigPersistence: Send + Sync {
    /// Read the stored record, or `None` when nothing has been saved yet.
    fn load(&self) -> StoreResult<Option<Value>>;

    /// Replace the stored record with `config`.
    fn save(&self, config: &TrackingConfig) -> StoreResult<()>;

    /// Human-readable location for logs.
    fn describe(&self) -> String;
}

/// Pretty-printed JSON file, replaced atomically on every save.
#[derive(Debug, Clone)]
pub struct JsonFilePersistence {
    path: PathBuf,
}

impl JsonFilePersistence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigPersistence for JsonFilePersistence {
    fn load(&self) -> StoreResult<Option<Value>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| StoreError::read(&self.path, e))?;
        let value = serde_json::from_str(&content).map_err(|e| StoreError::Parse {
            path: self.path.clone(),
            source: e,
        })?;
        Ok(Some(value))
    }

    fn save(&self, config: &TrackingConfig) -> StoreResult<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| StoreError::write(&self.path, e))?;
        serde_json::to_writer_pretty(&mut tmp, config)?;
        tmp.write_all(b"\n")
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| StoreError::write(&self.path, e))?;
        tmp.persist(&self.path)
            .map_err(|e| StoreError::write(&self.path, e.error))?;
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-memory record, for tests and ephemeral runs.
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    record: Mutex<Option<Value>>,
    saves: AtomicUsize,
}

impl MemoryPersistence {
    /// Start with a pre-existing record.
    pub fn with_record(record: Value) -> Self {
        Self {
            record: Mutex::new(Some(record)),
            saves: AtomicUsize::new(0),
        }
    }

    /// Currently stored record.
    pub fn record(&self) -> Option<Value> {
        self.record
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of completed saves.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl ConfigPersistence for MemoryPersistence {
    fn load(&self) -> StoreResult<Option<Value>> {
        Ok(self.record())
    }

    fn save(&self, config: &TrackingConfig) -> StoreResult<()> {
        let value = serde_json::to_value(config)?;
        *self.record.lock().unwrap_or_else(PoisonError::into_inner) = Some(value);
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

impl<P: ConfigPersistence + ?Sized> ConfigPersistence for std::sync::Arc<P> {
    fn load(&self) -> StoreResult<Option<Value>> {
        (**self).load()
    }

    fn save(&self, config: &TrackingConfig) -> StoreResult<()> {
        (**self).save(config)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facecam_models::Orientation;

    #[test]
    fn test_missing_file_loads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let persistence = JsonFilePersistence::new(dir.path().join("facecam_config.json"));
        assert!(persistence.load().unwrap().is_none());
    }

    #[test]
    fn test_save_writes_full_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("facecam_config.json");
        let persistence = JsonFilePersistence::new(&path);

        let config = TrackingConfig {
            camera_index: Some(2),
            orientation: Orientation::CounterClockwise,
            ..Default::default()
        };
        persistence.save(&config).unwrap();

        let raw: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["camera_index"], 2);
        assert_eq!(raw["orientation"], "ccw");
        assert_eq!(raw.as_object().unwrap().len(), 5);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("facecam_config.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = JsonFilePersistence::new(&path).load().unwrap_err();
        assert!(matches!(err, StoreError::Parse { .. }));
    }

    #[test]
    fn test_memory_persistence_counts_saves() {
        let persistence = MemoryPersistence::default();
        persistence.save(&TrackingConfig::default()).unwrap();
        persistence.save(&TrackingConfig::default()).unwrap();
        assert_eq!(persistence.save_count(), 2);
        assert!(persistence.record().is_some());
    }
}
