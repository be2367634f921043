use serde_json::Value;

use super::domain::{NormalizedSample, RawSample};

/// Converts a raw sample into typed optional fields. Never fails: anything missing or
/// malformed becomes `None`, and each acceleration axis is handled on its own.
pub fn normalize(raw: &RawSample) -> NormalizedSample {
    let heart_rate = raw.heart_rate.as_ref().and_then(coerce_number);

    let axis = |name: &str| {
        raw.acceleration
            .as_ref()
            .and_then(|accel| accel.as_object())
            .and_then(|axes| axes.get(name))
            .and_then(strict_number)
    };

    NormalizedSample {
        heart_rate,
        accel_x: axis("x"),
        accel_y: axis("y"),
        accel_z: axis("z"),
    }
}

// Heart rate tolerates numeric strings from gateways that stringify everything.
fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(_) => strict_number(value),
        Value::String(raw) => raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|number| number.is_finite()),
        _ => None,
    }
}

fn strict_number(value: &Value) -> Option<f64> {
    value.as_f64().filter(|number| number.is_finite())
}
