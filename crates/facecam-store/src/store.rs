//! Lock-guarded configuration store.

use std::sync::{Mutex, MutexGuard, PoisonError};

use facecam_models::{ConfigUpdate, TrackingConfig};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::persistence::ConfigPersistence;
use crate::validation::parse_update;

/// Shared runtime configuration.
///
/// The configuration lock is held only while a snapshot is copied or an
/// update is applied. Persistence runs under a separate lock so that writes
/// reach storage in order without blocking readers.
pub struct ConfigStore {
    state: Mutex<TrackingConfig>,
    persist_lock: Mutex<()>,
    persistence: Box<dyn ConfigPersistence>,
    reserved_index: Option<i32>,
}

impl ConfigStore {
    /// Create a store holding default values, without reading storage.
    pub fn new(persistence: impl ConfigPersistence + 'static, reserved_index: Option<i32>) -> Self {
        Self {
            state: Mutex::new(TrackingConfig::default()),
            persist_lock: Mutex::new(()),
            persistence: Box::new(persistence),
            reserved_index,
        }
    }

    /// Create a store and merge the persisted record over defaults.
    ///
    /// Fields are validated exactly like runtime updates and unknown keys are
    /// ignored. A persisted camera index equal to the reserved loopback index
    /// is cleared. Read failures are logged and leave the defaults in place.
    pub fn load(persistence: impl ConfigPersistence + 'static, reserved_index: Option<i32>) -> Self {
        let store = Self::new(persistence, reserved_index);

        match store.persistence.load() {
            Ok(Some(record)) => {
                let update = parse_update(&record);
                let mut config = store.lock_state();
                config.apply(&update);

                if reserved_index.is_some() && config.camera_index == reserved_index {
                    info!(
                        camera_index = ?config.camera_index,
                        "Resetting persisted camera_index that points at the loopback device"
                    );
                    config.camera_index = None;
                }

                info!(
                    location = %store.persistence.describe(),
                    config = ?*config,
                    "Loaded persisted config"
                );
            }
            Ok(None) => {
                debug!(location = %store.persistence.describe(), "No persisted config, using defaults");
            }
            Err(e) => {
                warn!(location = %store.persistence.describe(), error = %e, "Failed to read persisted config");
            }
        }

        store
    }

    /// Consistent snapshot of the whole configuration.
    pub fn get(&self) -> TrackingConfig {
        self.lock_state().clone()
    }

    /// Index reserved for the virtual-output loopback, if any.
    pub fn reserved_index(&self) -> Option<i32> {
        self.reserved_index
    }

    /// Parse a dynamic JSON payload and apply it.
    pub fn update_from_json(&self, payload: &Value) -> TrackingConfig {
        debug!(payload = %payload, "Config update payload");
        self.update(&parse_update(payload))
    }

    /// Apply the fields present in `update`, persist, and return the current snapshot.
    ///
    /// Never fails: a camera index equal to the reserved loopback index is
    /// dropped, out-of-range values are coerced, and persistence errors are
    /// logged while the in-memory configuration stays authoritative.
    pub fn update(&self, update: &ConfigUpdate) -> TrackingConfig {
        let mut update = update.clone();
        if update.camera_index.is_some() && update.camera_index == self.reserved_index {
            warn!(
                camera_index = ?update.camera_index,
                "Refusing to select the loopback output device as input"
            );
            update.camera_index = None;
        }

        let applied = {
            let mut config = self.lock_state();
            config.apply(&update)
        };

        if applied.is_empty() {
            return self.get();
        }
        info!(fields = ?applied, "Config updated");

        self.persist()
    }

    /// Write the latest snapshot to storage and return it.
    fn persist(&self) -> TrackingConfig {
        let _guard = self
            .persist_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let snapshot = self.get();

        match self.persistence.save(&snapshot) {
            Ok(()) => debug!(location = %self.persistence.describe(), config = ?snapshot, "Persisted config"),
            Err(e) => warn!(location = %self.persistence.describe(), error = %e, "Failed to write config"),
        }

        snapshot
    }

    fn lock_state(&self) -> MutexGuard<'_, TrackingConfig> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigStore")
            .field("config", &self.get())
            .field("persistence", &self.persistence.describe())
            .field("reserved_index", &self.reserved_index)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryPersistence;
    use facecam_models::Orientation;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn test_update_then_get() {
        let store = ConfigStore::new(MemoryPersistence::default(), None);
        let returned = store.update(&ConfigUpdate {
            camera_index: Some(2),
            detection_interval_frames: Some(4),
            ..Default::default()
        });

        let snapshot = store.get();
        assert_eq!(returned, snapshot);
        assert_eq!(snapshot.camera_index, Some(2));
        assert_eq!(snapshot.detection_interval_frames, 4);
        assert_eq!(snapshot.orientation, Orientation::None);
    }

    #[test]
    fn test_every_accepted_update_is_persisted() {
        let persistence = Arc::new(MemoryPersistence::default());
        let store = ConfigStore::new(Arc::clone(&persistence), None);

        store.update_from_json(&json!({"margin_factor": 2.0}));
        store.update_from_json(&json!({"orientation": "ccw"}));

        assert_eq!(persistence.save_count(), 2);
        let record = persistence.record().unwrap();
        assert_eq!(record["margin_factor"], 2.0);
        assert_eq!(record["orientation"], "ccw");
    }

    #[test]
    fn test_rejected_update_is_not_persisted() {
        let persistence = Arc::new(MemoryPersistence::default());
        let store = ConfigStore::new(Arc::clone(&persistence), None);

        let snapshot = store.update_from_json(&json!({"orientation": "sideways"}));

        assert_eq!(snapshot, TrackingConfig::default());
        assert_eq!(persistence.save_count(), 0);
    }

    #[test]
    fn test_reserved_index_rejected_on_update() {
        let store = ConfigStore::new(MemoryPersistence::default(), Some(0));
        let snapshot = store.update_from_json(&json!({"camera_index": 0, "margin_factor": 3.0}));

        assert_eq!(snapshot.camera_index, None);
        assert_eq!(snapshot.margin_factor, 3.0);
    }

    #[test]
    fn test_load_merges_over_defaults() {
        let persistence = MemoryPersistence::with_record(json!({
            "orientation": "cw",
            "smoothing_alpha": 0.2,
            "unknown": "ignored",
        }));
        let store = ConfigStore::load(persistence, None);

        let snapshot = store.get();
        assert_eq!(snapshot.orientation, Orientation::Clockwise);
        assert_eq!(snapshot.smoothing_alpha, 0.2);
        assert_eq!(snapshot.margin_factor, 2.8);
        assert_eq!(snapshot.detection_interval_frames, 10);
    }

    #[test]
    fn test_load_clears_reserved_camera_index() {
        let persistence = MemoryPersistence::with_record(json!({"camera_index": 0}));
        let store = ConfigStore::load(persistence, Some(0));
        assert_eq!(store.get().camera_index, None);

        let persistence = MemoryPersistence::with_record(json!({"camera_index": 0}));
        let store = ConfigStore::load(persistence, None);
        assert_eq!(store.get().camera_index, Some(0));
    }

    #[test]
    fn test_concurrent_updates_never_tear() {
        let store = Arc::new(ConfigStore::new(MemoryPersistence::default(), None));

        let writers: Vec<_> = (1..=4)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        store.update(&ConfigUpdate {
                            camera_index: Some(i),
                            detection_interval_frames: Some(i as u32),
                            ..Default::default()
                        });
                    }
                })
            })
            .collect();

        for _ in 0..200 {
            let snapshot = store.get();
            if let Some(index) = snapshot.camera_index {
                assert_eq!(index as u32, snapshot.detection_interval_frames);
            }
        }

        for writer in writers {
            writer.join().unwrap();
        }
    }
}
