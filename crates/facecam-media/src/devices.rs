//! Capture input enumeration.

use tracing::{debug, info};

use crate::capture::CaptureBackend;

/// Highest index probed when listing inputs, exclusive.
pub const DEFAULT_MAX_PROBE_INDEX: i32 = 10;

/// Index that must never be used as a capture input.
///
/// On Linux the virtual camera is expected at `/dev/video0`, so index 0 is
/// the pipeline's own output.
pub fn default_reserved_index() -> Option<i32> {
    if cfg!(target_os = "linux") {
        Some(0)
    } else {
        None
    }
}

/// List usable capture indices in `0..max_index`, ascending.
///
/// The currently selected input is included without probing since the
/// pipeline may hold it open. A current index outside the probed range is
/// appended at the end. The reserved index is never listed.
pub fn enumerate_inputs(
    backend: &dyn CaptureBackend,
    max_index: i32,
    reserved: Option<i32>,
    current: Option<i32>,
) -> Vec<i32> {
    let mut available = Vec::new();

    for index in 0..max_index.max(0) {
        if Some(index) == reserved {
            continue;
        }
        if Some(index) == current {
            available.push(index);
            continue;
        }
        if backend.probe(index) {
            debug!(index, backend = backend.name(), "Capture input available");
            available.push(index);
        }
    }

    if let Some(current) = current {
        if Some(current) != reserved && !available.contains(&current) {
            available.push(current);
        }
    }

    info!(count = available.len(), inputs = ?available, "Enumerated capture inputs");
    available
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Mutex;

    use super::*;
    use crate::capture::{CaptureDevice, CaptureHints};
    use crate::error::{MediaError, MediaResult};

    #[derive(Default)]
    struct FakeBackend {
        working: HashSet<i32>,
        probed: Mutex<Vec<i32>>,
    }

    impl FakeBackend {
        fn with(working: &[i32]) -> Self {
            Self {
                working: working.iter().copied().collect(),
                probed: Mutex::new(Vec::new()),
            }
        }

        fn probed(&self) -> Vec<i32> {
            self.probed.lock().unwrap().clone()
        }
    }

    impl CaptureBackend for FakeBackend {
        fn open(&self, index: i32, _hints: Option<&CaptureHints>) -> MediaResult<Box<dyn CaptureDevice>> {
            Err(MediaError::device_open(index, "not used"))
        }

        fn probe(&self, index: i32) -> bool {
            self.probed.lock().unwrap().push(index);
            self.working.contains(&index)
        }

        fn name(&self) -> &'static str {
            "fake"
        }
    }

    #[test]
    fn test_lists_working_inputs_ascending() {
        let backend = FakeBackend::with(&[4, 1, 2]);
        assert_eq!(enumerate_inputs(&backend, 10, None, None), vec![1, 2, 4]);
    }

    #[test]
    fn test_skips_reserved_without_probing() {
        let backend = FakeBackend::with(&[0, 1]);
        assert_eq!(enumerate_inputs(&backend, 10, Some(0), None), vec![1]);
        assert!(!backend.probed().contains(&0));
    }

    #[test]
    fn test_current_included_without_probing() {
        let backend = FakeBackend::with(&[1]);
        assert_eq!(enumerate_inputs(&backend, 10, Some(0), Some(3)), vec![1, 3]);
        assert!(!backend.probed().contains(&3));
    }

    #[test]
    fn test_current_outside_range_appended() {
        let backend = FakeBackend::with(&[2]);
        assert_eq!(enumerate_inputs(&backend, 10, Some(0), Some(12)), vec![2, 12]);
    }

    #[test]
    fn test_reserved_current_not_listed() {
        let backend = FakeBackend::with(&[]);
        assert!(enumerate_inputs(&backend, 10, Some(0), Some(0)).is_empty());
    }

    #[test]
    fn test_zero_range() {
        let backend = FakeBackend::with(&[0]);
        assert!(enumerate_inputs(&backend, 0, None, None).is_empty());
    }
}
