//! Rotation applied to captured frames before tracking.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Rotation applied after capture.
///
/// Serialized with the short names used by the control surface
/// (`"none"`, `"cw"`, `"ccw"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Orientation {
    /// Frames are used as delivered.
    #[default]
    #[serde(rename = "none")]
    None,

    /// Rotate 90 degrees clockwise.
    #[serde(rename = "cw")]
    Clockwise,

    /// Rotate 90 degrees counter-clockwise.
    #[serde(rename = "ccw")]
    CounterClockwise,
}

impl Orientation {
    /// All supported orientations.
    pub const ALL: &'static [Orientation] = &[
        Orientation::None,
        Orientation::Clockwise,
        Orientation::CounterClockwise,
    ];

    /// Returns the wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::None => "none",
            Orientation::Clockwise => "cw",
            Orientation::CounterClockwise => "ccw",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown orientation name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown orientation '{0}', expected one of: none, cw, ccw")]
pub struct OrientationParseError(pub String);

impl FromStr for Orientation {
    type Err = OrientationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Orientation::None),
            "cw" => Ok(Orientation::Clockwise),
            "ccw" => Ok(Orientation::CounterClockwise),
            other => Err(OrientationParseError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names_round_trip() {
        for orientation in Orientation::ALL {
            let parsed: Orientation = orientation.as_str().parse().unwrap();
            assert_eq!(parsed, *orientation);

            let json = serde_json::to_string(orientation).unwrap();
            assert_eq!(json, format!("\"{}\"", orientation.as_str()));
        }
    }

    #[test]
    fn test_unknown_name_rejected() {
        assert!("clockwise".parse::<Orientation>().is_err());
        assert!("CW".parse::<Orientation>().is_err());
        assert!(serde_json::from_str::<Orientation>("\"upside_down\"").is_err());
    }
}
