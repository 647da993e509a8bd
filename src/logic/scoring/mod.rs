//! Scoring Module - Decay-weighted Decision Load Score
//!
//! Pure function of the windowed event log and `now`. Nothing is carried
//! between calls, so the score can be re-derived from the log at any time.
//!
//! - `decay.rs`: half-life decay and per-kind base weights
//! - `threshold.rs`: GREEN/AMBER/RED classification and the early-warning rule

pub mod decay;
pub mod threshold;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};

use crate::logic::activity::{prune_window, Event, EventData};

pub use decay::{base_weight, decay_weight, HALF_LIFE_MS};
pub use threshold::{effective_state, DlsState};

/// Hover seconds per indecision point
const INDECISION_SECONDS_PER_POINT: f64 = 20.0;
/// Cap of the indecision term per window
const INDECISION_CAP: f64 = 10.0;
/// raw → DLS scale
const DLS_SCALE: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DlsScore {
    /// 0..=100
    pub dls: u8,
    pub raw: f64,
}

impl DlsScore {
    pub fn state(&self) -> DlsState {
        DlsState::from_dls(self.dls)
    }
}

/// Decay-weighted raw score over the window ending at `now`
pub fn compute_raw_score(events: &[Event], now: i64) -> f64 {
    let mut score = 0.0;
    let mut indecision_seconds = 0.0;

    for event in prune_window(events, now) {
        let w = decay_weight(now - event.timestamp);
        match &event.data {
            EventData::HoverIndecision { seconds } => indecision_seconds += seconds * w,
            _ => score += base_weight(event.kind()) * w,
        }
    }

    let indecision_score = (indecision_seconds / INDECISION_SECONDS_PER_POINT).min(INDECISION_CAP);
    score + indecision_score
}

pub fn compute_dls(events: &[Event], now: i64) -> DlsScore {
    let raw = compute_raw_score(events, now);
    let dls = (raw * DLS_SCALE).round().clamp(0.0, 100.0) as u8;
    DlsScore { dls, raw }
}
