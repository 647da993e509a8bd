//! Logistic Regression - single dense layer with sigmoid output
//!
//! `risk = sigmoid(W·x + b)`. Trained with binary cross-entropy and Adam
//! on shuffled mini-batches.

use ndarray::{Array1, Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::optimizer::Adam;
use super::ModelError;

/// Clip for log() in the loss
const LOSS_EPSILON: f32 = 1e-7;

// ============================================================================
// TRAINING INPUT / OUTPUT
// ============================================================================

/// Fit hyper-parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitOptions {
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f32,
    /// Fixed seed for reproducible shuffles
    pub seed: Option<u64>,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            epochs: 20,
            batch_size: 16,
            learning_rate: 0.05,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitReport {
    pub epochs: usize,
    pub samples: usize,
    /// Mean BCE over the training set after the last epoch
    pub final_loss: f32,
}

// ============================================================================
// MODEL
// ============================================================================

#[inline]
pub fn sigmoid(z: f32) -> f32 {
    1.0 / (1.0 + (-z).exp())
}

#[derive(Debug, Clone)]
pub struct LogisticModel {
    weights: Array1<f32>,
    bias: f32,
    optimizer: Adam,
    model_id: String,
}

impl LogisticModel {
    /// Fresh model: Glorot-uniform kernel, zero bias
    pub fn new(input_dim: usize) -> Self {
        Self::with_rng(input_dim, &mut StdRng::from_entropy())
    }

    pub fn with_rng<R: Rng>(input_dim: usize, rng: &mut R) -> Self {
        let limit = (6.0 / (input_dim as f32 + 1.0)).sqrt();
        let weights = Array1::from_shape_fn(input_dim, |_| rng.gen_range(-limit..limit));
        Self::from_parts(weights.to_vec(), 0.0, uuid::Uuid::new_v4().to_string())
    }

    /// Rebuild from stored parameters (optimizer state starts fresh)
    pub fn from_parts(weights: Vec<f32>, bias: f32, model_id: String) -> Self {
        let dim = weights.len();
        Self {
            weights: Array1::from_vec(weights),
            bias,
            optimizer: Adam::new(dim, FitOptions::default().learning_rate),
            model_id,
        }
    }

    pub fn input_dim(&self) -> usize {
        self.weights.len()
    }

    pub fn weights(&self) -> ArrayView1<'_, f32> {
        self.weights.view()
    }

    pub fn bias(&self) -> f32 {
        self.bias
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// `W·x + b`; missing inputs count as 0
    pub fn logit(&self, x: &[f32]) -> f32 {
        self.weights
            .iter()
            .zip(x.iter().chain(std::iter::repeat(&0.0)))
            .map(|(w, v)| w * v)
            .sum::<f32>()
            + self.bias
    }

    /// Overload risk in [0,1]
    pub fn predict(&self, x: &[f32]) -> f32 {
        let risk = sigmoid(self.logit(x));
        if risk.is_nan() {
            return 0.0;
        }
        risk.clamp(0.0, 1.0)
    }

    /// Mean binary cross-entropy
    pub fn loss(&self, xs: &Array2<f32>, ys: &Array1<f32>) -> f32 {
        if ys.is_empty() {
            return 0.0;
        }
        let p = (xs.dot(&self.weights) + self.bias).mapv(sigmoid);
        let total: f32 = p
            .iter()
            .zip(ys.iter())
            .map(|(&p, &y)| {
                let p = p.clamp(LOSS_EPSILON, 1.0 - LOSS_EPSILON);
                -(y * p.ln() + (1.0 - y) * (1.0 - p).ln())
            })
            .sum();
        total / ys.len() as f32
    }

    /// Train in place on `(features, label)` pairs.
    ///
    /// On error the parameters are whatever the last finite update left;
    /// callers fit a copy and only install it on success.
    pub fn fit(&mut self, data: &[([f32; super::INPUT_DIM], f32)], options: &FitOptions) -> Result<FitReport, ModelError> {
        if data.is_empty() {
            return Err(ModelError::EmptyTrainingSet);
        }
        let dim = self.input_dim();
        if dim != super::INPUT_DIM {
            return Err(ModelError::DimensionMismatch { expected: super::INPUT_DIM, actual: dim });
        }

        let batch_size = options.batch_size.max(1);
        self.optimizer.learning_rate = options.learning_rate;
        let mut rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let n = data.len();
        let flat: Vec<f32> = data.iter().flat_map(|(x, _)| x.iter().copied()).collect();
        let all_x = Array2::from_shape_vec((n, dim), flat)
            .map_err(|e| ModelError::MalformedWeights(e.to_string()))?;
        let all_y = Array1::from_iter(data.iter().map(|(_, y)| *y));

        let mut order: Vec<usize> = (0..n).collect();
        let mut final_loss = self.loss(&all_x, &all_y);

        for epoch in 0..options.epochs {
            order.shuffle(&mut rng);

            for batch in order.chunks(batch_size) {
                let xs = all_x.select(ndarray::Axis(0), batch);
                let ys = all_y.select(ndarray::Axis(0), batch);

                // dL/dz of sigmoid + BCE is (p - y)
                let p = (xs.dot(&self.weights) + self.bias).mapv(sigmoid);
                let err = p - &ys;
                let m = batch.len() as f32;
                let grad_w = xs.t().dot(&err) / m;
                let grad_b = err.sum() / m;

                self.optimizer.apply(&mut self.weights, &mut self.bias, &grad_w, grad_b);
            }

            final_loss = self.loss(&all_x, &all_y);
            let params_finite = self.bias.is_finite() && self.weights.iter().all(|w| w.is_finite());
            if !final_loss.is_finite() || !params_finite {
                return Err(ModelError::Diverged { epoch });
            }
        }

        Ok(FitReport {
            epochs: options.epochs,
            samples: n,
            final_loss,
        })
    }
}
