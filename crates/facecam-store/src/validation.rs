//! Lenient parsing of partial configuration payloads.
//!
//! Each recognized field is validated on its own. A malformed field is
//! dropped with a warning and never fails the whole update.

use facecam_models::{ConfigUpdate, Orientation};
use serde_json::{Map, Value};
use tracing::warn;

/// Key used by older config files for `detection_interval_frames`.
const LEGACY_INTERVAL_KEY: &str = "detection_every_n_frames";

/// Parse a dynamic JSON payload into a [`ConfigUpdate`].
///
/// Non-object payloads yield an empty update. Unknown keys are ignored.
pub fn parse_update(payload: &Value) -> ConfigUpdate {
    let Some(fields) = payload.as_object() else {
        if !payload.is_null() {
            warn!(payload = %payload, "Ignoring non-object config payload");
        }
        return ConfigUpdate::default();
    };

    ConfigUpdate {
        camera_index: present(fields, "camera_index")
            .and_then(|v| parse_field(v, "camera_index", parse_camera_index)),
        orientation: present(fields, "orientation")
            .and_then(|v| parse_field(v, "orientation", parse_orientation)),
        detection_interval_frames: interval_value(fields)
            .and_then(|v| parse_field(v, "detection_interval_frames", parse_interval)),
        smoothing_alpha: present(fields, "smoothing_alpha")
            .and_then(|v| parse_field(v, "smoothing_alpha", parse_float)),
        margin_factor: present(fields, "margin_factor")
            .and_then(|v| parse_field(v, "margin_factor", parse_float)),
    }
}

/// A key set to `null` counts as absent.
fn present<'a>(fields: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    fields.get(key).filter(|v| !v.is_null())
}

fn interval_value(fields: &Map<String, Value>) -> Option<&Value> {
    present(fields, "detection_interval_frames").or_else(|| present(fields, LEGACY_INTERVAL_KEY))
}

fn parse_field<T>(value: &Value, field: &str, parse: fn(&Value) -> Option<T>) -> Option<T> {
    let parsed = parse(value);
    if parsed.is_none() {
        warn!(field, value = %value, "Invalid config field dropped");
    }
    parsed
}

fn parse_camera_index(value: &Value) -> Option<i32> {
    value.as_i64().and_then(|i| i32::try_from(i).ok())
}

fn parse_orientation(value: &Value) -> Option<Orientation> {
    value.as_str().and_then(|s| s.parse().ok())
}

/// Integers, finite floats (truncated) and integer strings; floored at 1.
fn parse_interval(value: &Value) -> Option<u32> {
    let n = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))?,
        Value::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };
    Some(n.clamp(1, i64::from(u32::MAX)) as u32)
}

/// Finite numbers or numeric strings.
fn parse_float(value: &Value) -> Option<f64> {
    let f = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    f.is_finite().then_some(f)
}
