//! Decay weighting and per-kind base weights

use crate::logic::activity::EventKind;

/// Half-life of an event's influence (10 minutes)
pub const HALF_LIFE_MS: i64 = 10 * 60 * 1000;

/// `0.5 ^ (age / HALF_LIFE_MS)`, 1 for ages at or below zero
pub fn decay_weight(age_ms: i64) -> f64 {
    if age_ms <= 0 {
        return 1.0;
    }
    0.5f64.powf(age_ms as f64 / HALF_LIFE_MS as f64)
}

/// Direct contribution of one event of this kind at age zero
pub fn base_weight(kind: EventKind) -> f64 {
    match kind {
        EventKind::ClickAction => 1.0,
        EventKind::OpenThread => 2.0,
        EventKind::ReopenSameThread => 3.0,
        EventKind::UndoAction => 4.0,
        EventKind::ContextSwitch => 2.0,
        // hover_indecision feeds the separate indecision term
        _ => 0.0,
    }
}
