//! Training Module - sample collection and the retraining state machine

pub mod orchestrator;
pub mod samples;


pub use orchestrator::{
    Completion, TrainReason, TrainingJob, TrainingOrchestrator, TrainingOutcome, TrainingPhase,
};
pub use samples::{Sample, SampleBuffer, SampleThrottle};
