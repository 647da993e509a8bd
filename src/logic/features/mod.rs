//! Features Module - Feature Extraction Engine
//!
//! Derives the classifier's 7-dimensional input from the event window.
//! Kept separate from scoring so the weighting scheme can change without
//! touching stored models.

pub mod extract;
pub mod layout;
pub mod vector;

#[cfg(test)]
mod tests;

pub use extract::{compute_feature_vector, compute_raw_features, normalize, NORMALIZATION_SCALES};
pub use layout::{feature_name, layout_hash, FEATURE_COUNT, FEATURE_LAYOUT, FEATURE_VERSION};
pub use vector::{FeatureVector, RawFeatures};
