//! Lenient payload field decoding
//!
//! Observers send loosely typed payloads. A wrong-typed or out-of-range
//! field decodes to its default instead of failing the whole event.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::event::{ClickAction, ContextSwitchKind};

/// Non-negative finite seconds, 0 otherwise
pub fn seconds<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(value
        .as_f64()
        .filter(|s| s.is_finite() && *s >= 0.0)
        .unwrap_or(0.0))
}

/// Non-empty trimmed string, absent otherwise
pub fn opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        _ => None,
    })
}

/// Known action name, `other` for unknown names, absent for empty/non-string
pub fn click_action<'de, D: Deserializer<'de>>(d: D) -> Result<Option<ClickAction>, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(value.as_str().and_then(ClickAction::parse))
}

pub fn context_switch_kind<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<Option<ContextSwitchKind>, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(value.as_str().and_then(ContextSwitchKind::parse))
}

/// Boolean, false for anything else
pub fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(value.as_bool().unwrap_or(false))
}
