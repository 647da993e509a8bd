//! Feature vectors: named raw values and the normalized classifier input

use serde::{Deserialize, Serialize};

use super::layout::{feature_index, layout_hash, validate_layout, LayoutMismatchError, FEATURE_COUNT, FEATURE_VERSION};

/// Unscaled window statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFeatures {
    pub events_per_minute: f64,
    pub reopen_rate: f64,
    /// Seconds
    pub avg_time_to_action: f64,
    pub undo_rate: f64,
    pub context_switch_rate: f64,
    /// 0..1
    pub indecision_time_ratio: f64,
    pub decision_variety_count: f64,
}

impl RawFeatures {
    /// Layout order
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.events_per_minute,
            self.reopen_rate,
            self.avg_time_to_action,
            self.undo_rate,
            self.context_switch_rate,
            self.indecision_time_ratio,
            self.decision_variety_count,
        ]
    }
}

/// Normalized input, stamped with the layout it was built for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub version: u8,
    pub layout_hash: u32,
    /// Each in [0,1]
    pub values: [f32; FEATURE_COUNT],
}

impl FeatureVector {
    pub fn from_values(values: [f32; FEATURE_COUNT]) -> Self {
        Self {
            version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            values,
        }
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    pub fn get_by_name(&self, name: &str) -> Option<f32> {
        feature_index(name).map(|i| self.values[i])
    }

    pub fn validate(&self) -> Result<(), LayoutMismatchError> {
        validate_layout(self.version, self.layout_hash)
    }
}

impl Default for FeatureVector {
    fn default() -> Self {
        Self::from_values([0.0; FEATURE_COUNT])
    }
}
