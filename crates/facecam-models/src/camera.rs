//! Camera listings exposed by the control surface.

use serde::{Deserialize, Serialize};

/// A selectable input camera.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraEntry {
    pub index: i32,
    pub label: String,
}

impl CameraEntry {
    /// Build an entry, marking the currently selected index.
    pub fn new(index: i32, current: Option<i32>) -> Self {
        let mut label = format!("Camera {}", index);
        if current == Some(index) {
            label.push_str(" (current)");
        }
        Self { index, label }
    }
}

/// Response body for camera enumeration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraList {
    pub cameras: Vec<CameraEntry>,
}

impl CameraList {
    /// Build a listing from enumerated indices.
    pub fn from_indices(indices: &[i32], current: Option<i32>) -> Self {
        Self {
            cameras: indices
                .iter()
                .map(|&index| CameraEntry::new(index, current))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_camera_is_annotated() {
        let list = CameraList::from_indices(&[1, 2, 3], Some(2));
        let labels: Vec<&str> = list.cameras.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["Camera 1", "Camera 2 (current)", "Camera 3"]);
    }

    #[test]
    fn test_no_current_camera() {
        let list = CameraList::from_indices(&[4], None);
        assert_eq!(list.cameras[0].label, "Camera 4");
    }
}
