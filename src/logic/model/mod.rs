//! Model Module - Adaptive overload classifier
//!
//! Single dense layer over the normalized feature vector. Inference is a
//! pure function of a model snapshot; training and persistence live in
//! `training` and `artifacts`.

pub mod artifacts;
pub mod explain;
pub mod logreg;
pub mod optimizer;


use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logic::features::layout::LayoutMismatchError;
use crate::logic::features::FEATURE_COUNT;

pub use artifacts::{load_or_fresh, ModelArtifacts, ModelTopology, WeightSpec, MODEL_KIND};
pub use explain::{top_contributors, FeatureContribution, TOP_CONTRIBUTORS};
pub use logreg::{sigmoid, FitOptions, FitReport, LogisticModel};

/// Classifier input width
pub const INPUT_DIM: usize = FEATURE_COUNT;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("training set is empty")]
    EmptyTrainingSet,

    #[error("input dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error(transparent)]
    LayoutMismatch(#[from] LayoutMismatchError),

    #[error("weight checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("weight data is not valid base64: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("malformed weights: {0}")]
    MalformedWeights(String),

    #[error("training diverged at epoch {epoch}")]
    Diverged { epoch: usize },

    #[error("training aborted: {0}")]
    Aborted(String),
}

// ============================================================================
// METADATA
// ============================================================================

/// Persisted next to the artifacts. `trained_at: None` means never trained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelMeta {
    #[serde(default, rename = "trainedAt", alias = "trained_at")]
    pub trained_at: Option<i64>,
}

impl ModelMeta {
    pub fn is_trained(&self) -> bool {
        self.trained_at.is_some()
    }
}
