use serde_json::Value;

use crate::constants::{SCORE_MAX, SCORE_MIN};

/// Coerces a raw score into `[0, 100]`.
///
/// Numbers and numeric strings are accepted; fractional values round to the
/// nearest integer. Out-of-range or unparsable input yields `None`, never a
/// clamped value, so an unknown score stays distinguishable from zero.
pub fn coerce_score(value: &Value) -> Option<u8> {
    let number = match value {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => text.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    if !number.is_finite() || !(SCORE_MIN..=SCORE_MAX).contains(&number) {
        return None;
    }

    Some(number.round() as u8)
}
