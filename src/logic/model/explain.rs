//! Feature attribution for the dense layer
//!
//! Contribution of feature i is `w_i * x_i`. Bias is not attributed.

use serde::{Deserialize, Serialize};

use crate::logic::features::{feature_name, FeatureVector};

use super::logreg::LogisticModel;

/// How many contributors the state message carries
pub const TOP_CONTRIBUTORS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureContribution {
    pub name: String,
    /// Signed `w_i * x_i`
    pub contribution: f32,
}

/// Top `n` features by `|w_i * x_i|`, largest first
pub fn top_contributors(model: &LogisticModel, fv: &FeatureVector, n: usize) -> Vec<FeatureContribution> {
    let mut contributions: Vec<FeatureContribution> = model
        .weights()
        .iter()
        .zip(fv.values.iter())
        .enumerate()
        .map(|(i, (w, x))| FeatureContribution {
            name: feature_name(i).unwrap_or("unknown").to_string(),
            contribution: w * x,
        })
        .collect();

    contributions.sort_by(|a, b| b.contribution.abs().total_cmp(&a.contribution.abs()));
    contributions.truncate(n);
    contributions
}
