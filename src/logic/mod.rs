//! Logic Module - scoring, learning and the engine that drives them
//!
//! Leaf to root:
//! - `activity/` - typed events and the sliding window
//! - `scoring/` - decay-weighted DLS and tri-state classification
//! - `features/` - versioned 7-feature vector
//! - `model/` - logistic classifier, artifacts, attribution
//! - `training/` - sample buffer and retraining state machine
//! - `storage/` - key-value backends and the write-back cache
//! - `session/` - the single owner of guard state
//! - `engine` - async loop serializing everything onto the session

pub mod activity;
pub mod config;
pub mod engine;
pub mod events;
pub mod features;
pub mod model;
pub mod scoring;
pub mod session;
pub mod storage;
pub mod training;
