//! Feature extraction over the event window
//!
//! Unweighted counts and ratios, independent of the scorer's decay.

use std::collections::HashSet;

use crate::logic::activity::{prune_window, Event, EventData, WINDOW_MS};

use super::layout::FEATURE_COUNT;
use super::vector::{FeatureVector, RawFeatures};

/// Divisors mapping each raw feature onto [0,1], layout order.
/// 12 events/min is very busy, 60 s to first action is slow.
pub const NORMALIZATION_SCALES: [f64; FEATURE_COUNT] = [12.0, 0.8, 60.0, 0.3, 2.0, 1.0, 5.0];

const WINDOW_MINUTES: f64 = WINDOW_MS as f64 / 60_000.0;
const WINDOW_SECONDS: f64 = WINDOW_MS as f64 / 1_000.0;

fn clamp01(x: f64) -> f64 {
    if x.is_nan() {
        return 0.0;
    }
    x.clamp(0.0, 1.0)
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Raw features for the window ending at `now`
pub fn compute_raw_features(events: &[Event], now: i64) -> RawFeatures {
    let window = prune_window(events, now);

    let substantive = window.iter().filter(|e| e.kind().is_substantive()).count();

    let mut opens = 0usize;
    let mut reopens = 0usize;
    let mut clicks = 0usize;
    let mut undos = 0usize;
    let mut context_switches = 0usize;
    let mut indecision_seconds = 0.0f64;
    let mut time_to_action = Vec::new();
    let mut variety: HashSet<&str> = HashSet::new();

    for event in window {
        match &event.data {
            EventData::OpenThread { .. } => opens += 1,
            EventData::ReopenSameThread { .. } => reopens += 1,
            EventData::ClickAction { action, .. } => {
                clicks += 1;
                if let Some(name) = action.as_ref().map(|a| a.as_str()).filter(|n| !n.is_empty()) {
                    variety.insert(name);
                }
            }
            EventData::UndoAction => undos += 1,
            EventData::ContextSwitch { .. } => context_switches += 1,
            EventData::HoverIndecision { seconds } => indecision_seconds += seconds,
            EventData::TimeToFirstAction { seconds } => time_to_action.push(*seconds),
            _ => {}
        }
    }

    let avg_time_to_action = if time_to_action.is_empty() {
        0.0
    } else {
        time_to_action.iter().sum::<f64>() / time_to_action.len() as f64
    };

    RawFeatures {
        events_per_minute: substantive as f64 / WINDOW_MINUTES,
        reopen_rate: ratio(reopens, opens),
        avg_time_to_action,
        undo_rate: ratio(undos, clicks),
        context_switch_rate: context_switches as f64 / WINDOW_MINUTES,
        indecision_time_ratio: clamp01(indecision_seconds / WINDOW_SECONDS),
        decision_variety_count: variety.len() as f64,
    }
}

/// Scale and clamp each feature into [0,1]
pub fn normalize(raw: &RawFeatures) -> FeatureVector {
    let mut values = [0.0f32; FEATURE_COUNT];
    for (i, (value, scale)) in raw.to_array().iter().zip(NORMALIZATION_SCALES).enumerate() {
        values[i] = clamp01(value / scale) as f32;
    }
    FeatureVector::from_values(values)
}

pub fn compute_feature_vector(events: &[Event], now: i64) -> FeatureVector {
    normalize(&compute_raw_features(events, now))
}
