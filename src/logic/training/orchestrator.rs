//! Training Orchestrator - decides when to retrain and owns the live model
//!
//! Idle -> Training on a manual request or the automatic gate; Training ->
//! Idle when the job's outcome comes back. The fit itself runs elsewhere on
//! an owned copy, so the live model keeps serving inference meanwhile.

use serde::{Deserialize, Serialize};

use crate::logic::config::TrainingConfig;
use crate::logic::features::FeatureVector;
use crate::logic::model::{
    top_contributors, FeatureContribution, FitOptions, FitReport, LogisticModel, ModelArtifacts,
    ModelError, ModelMeta, INPUT_DIM, TOP_CONTRIBUTORS,
};

use super::samples::SampleBuffer;

// ============================================================================
// TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainReason {
    Auto,
    Manual,
}

impl TrainReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrainReason::Auto => "auto",
            TrainReason::Manual => "manual",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingPhase {
    Idle,
    Training,
}

/// Owned snapshot handed to the blocking pool
#[derive(Debug)]
pub struct TrainingJob {
    pub generation: u64,
    pub reason: TrainReason,
    model: LogisticModel,
    data: Vec<([f32; INPUT_DIM], f32)>,
    options: FitOptions,
}

impl TrainingJob {
    pub fn sample_count(&self) -> usize {
        self.data.len()
    }

    /// Fit the snapshot. CPU bound; call from a blocking context.
    pub fn run(mut self) -> TrainingOutcome {
        let result = self
            .model
            .fit(&self.data, &self.options)
            .map(|report| (self.model, report));
        TrainingOutcome {
            generation: self.generation,
            reason: self.reason,
            result,
        }
    }
}

#[derive(Debug)]
pub struct TrainingOutcome {
    pub generation: u64,
    pub reason: TrainReason,
    pub result: Result<(LogisticModel, FitReport), ModelError>,
}

impl TrainingOutcome {
    pub fn failed(generation: u64, reason: TrainReason, error: ModelError) -> Self {
        Self {
            generation,
            reason,
            result: Err(error),
        }
    }
}

/// What `complete` did with an outcome
#[derive(Debug)]
pub enum Completion {
    Installed { reason: TrainReason, report: FitReport },
    Failed { reason: TrainReason, error: ModelError },
    /// Finished after a reset; result dropped
    Stale,
}

// ============================================================================
// ORCHESTRATOR
// ============================================================================

pub struct TrainingOrchestrator {
    model: LogisticModel,
    meta: ModelMeta,
    phase: TrainingPhase,
    generation: u64,
    config: TrainingConfig,
}

impl TrainingOrchestrator {
    pub fn new(model: LogisticModel, meta: ModelMeta, config: TrainingConfig) -> Self {
        Self {
            model,
            meta,
            phase: TrainingPhase::Idle,
            generation: 0,
            config,
        }
    }

    pub fn model(&self) -> &LogisticModel {
        &self.model
    }

    pub fn meta(&self) -> ModelMeta {
        self.meta
    }

    pub fn phase(&self) -> TrainingPhase {
        self.phase
    }

    pub fn is_training(&self) -> bool {
        self.phase == TrainingPhase::Training
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn artifacts(&self) -> ModelArtifacts {
        self.model.to_artifacts()
    }

    /// Volume- and recency-gated automatic trigger
    pub fn should_auto_train(&self, sample_count: usize, now: i64) -> bool {
        if !self.config.auto_train || self.is_training() {
            return false;
        }
        if sample_count < self.config.min_samples {
            return false;
        }
        match self.meta.trained_at {
            None => true,
            Some(trained_at) => now - trained_at > self.config.min_interval_ms,
        }
    }

    /// Enter `Training` and snapshot a job, or `None` if a run is in flight
    pub fn begin(&mut self, reason: TrainReason, samples: &SampleBuffer) -> Option<TrainingJob> {
        if self.is_training() {
            log::debug!("Training already in flight, ignoring {} request", reason.as_str());
            return None;
        }
        self.phase = TrainingPhase::Training;

        let data = samples
            .recent(self.config.train_window)
            .iter()
            .map(|s| s.as_pair())
            .collect::<Vec<_>>();

        log::info!(
            "Training started ({}): {} samples, generation {}",
            reason.as_str(),
            data.len(),
            self.generation
        );

        Some(TrainingJob {
            generation: self.generation,
            reason,
            model: self.model.clone(),
            data,
            options: FitOptions {
                epochs: self.config.epochs,
                batch_size: self.config.batch_size,
                learning_rate: self.config.learning_rate,
                seed: None,
            },
        })
    }

    /// Back to `Idle`; install the fitted model if the run is current
    pub fn complete(&mut self, outcome: TrainingOutcome, now: i64) -> Completion {
        self.phase = TrainingPhase::Idle;

        if outcome.generation != self.generation {
            log::info!(
                "Discarding training result from generation {} (current {})",
                outcome.generation,
                self.generation
            );
            return Completion::Stale;
        }

        match outcome.result {
            Ok((model, report)) => {
                log::info!(
                    "Training finished ({}): {} samples, loss {:.4}",
                    outcome.reason.as_str(),
                    report.samples,
                    report.final_loss
                );
                self.model = model;
                self.meta.trained_at = Some(now);
                Completion::Installed {
                    reason: outcome.reason,
                    report,
                }
            }
            Err(error) => {
                log::warn!("Training failed ({}): {}", outcome.reason.as_str(), error);
                Completion::Failed {
                    reason: outcome.reason,
                    error,
                }
            }
        }
    }

    /// Risk and top contributors; `None` until a model has been trained
    pub fn inference(&self, fv: &FeatureVector) -> Option<(f32, Vec<FeatureContribution>)> {
        if !self.meta.is_trained() {
            return None;
        }
        let risk = self.model.predict(fv.as_slice());
        Some((risk, top_contributors(&self.model, fv, TOP_CONTRIBUTORS)))
    }

    /// Back to `Idle` for a job that was dropped before it ran
    pub fn cancel(&mut self) {
        self.phase = TrainingPhase::Idle;
    }

    /// Forget training metadata and orphan any in-flight run.
    /// Parameters stay in memory.
    pub fn reset_meta(&mut self) {
        self.meta = ModelMeta::default();
        self.generation += 1;
    }
}
