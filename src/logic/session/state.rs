//! Guard state - the derived snapshot pushed to consumers
//!
//! Recomputed on every tick and every inbound event. Never persisted.

use serde::{Deserialize, Serialize};

use crate::logic::activity::EventKind;
use crate::logic::model::FeatureContribution;
use crate::logic::scoring::DlsState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelState {
    /// A trained model is serving inference
    pub available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overload_risk: Option<f32>,
    #[serde(default)]
    pub top_contributors: Vec<FeatureContribution>,
    pub training: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trained_at: Option<i64>,
    pub sample_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardState {
    pub now: i64,
    pub dls: u8,
    pub raw_score: f64,
    pub state: DlsState,
    /// Never below `state`
    pub effective_state: DlsState,
    pub window_event_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_event_type: Option<EventKind>,
    pub model: ModelState,
}
