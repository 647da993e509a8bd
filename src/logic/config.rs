//! Guard Configuration
//!
//! Operational knobs for a session: tick cadence, persistence, training
//! gates and the early-warning override. Scoring constants are fixed and
//! live next to the scorer.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    self, env_flag, env_or, DEFAULT_PERSIST_DEBOUNCE_MS, DEFAULT_RISK_MIN_DLS,
    DEFAULT_RISK_THRESHOLD, DEFAULT_TICK_MS,
};

/// Early-warning override thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EarlyWarning {
    /// Model risk must be strictly above this
    pub risk_threshold: f32,
    /// DLS must be at least this
    pub min_dls: u8,
}

impl Default for EarlyWarning {
    fn default() -> Self {
        Self {
            risk_threshold: DEFAULT_RISK_THRESHOLD,
            min_dls: DEFAULT_RISK_MIN_DLS,
        }
    }
}

/// Training gates and fit parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Allow the automatic trigger (manual requests always work)
    pub auto_train: bool,
    /// Minimum buffered samples before auto training
    pub min_samples: usize,
    /// Minimum time between automatic runs
    pub min_interval_ms: i64,
    /// Most recent samples used per run
    pub train_window: usize,
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f32,
    /// Ring buffer capacity
    pub sample_capacity: usize,
    /// Pseudo-label throttle
    pub sample_interval_ms: i64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            auto_train: true,
            min_samples: 200,
            min_interval_ms: 10 * 60 * 1000,
            train_window: 800,
            epochs: 20,
            batch_size: 16,
            learning_rate: 0.05,
            sample_capacity: 2000,
            sample_interval_ms: 5_000,
        }
    }
}

/// Session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardConfig {
    /// Where the SQLite store lives
    pub data_dir: PathBuf,
    /// Use the in-memory store instead of SQLite
    pub ephemeral: bool,
    pub tick_interval_ms: u64,
    pub persist_debounce_ms: u64,
    /// Deferred list cap
    pub deferred_capacity: usize,
    /// An open within this long after a previous open of the same thread is a reopen
    pub reopen_within_ms: i64,
    pub early_warning: EarlyWarning,
    pub training: TrainingConfig,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            ephemeral: false,
            tick_interval_ms: DEFAULT_TICK_MS,
            persist_debounce_ms: DEFAULT_PERSIST_DEBOUNCE_MS,
            deferred_capacity: 200,
            reopen_within_ms: 3 * 60 * 1000,
            early_warning: EarlyWarning::default(),
            training: TrainingConfig::default(),
        }
    }
}

impl GuardConfig {
    /// Defaults overridden by `DLS_*` environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let data_dir = std::env::var("DLS_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        Self {
            data_dir,
            ephemeral: env_flag("DLS_EPHEMERAL", false),
            tick_interval_ms: env_or("DLS_TICK_MS", defaults.tick_interval_ms).max(100),
            persist_debounce_ms: env_or("DLS_PERSIST_DEBOUNCE_MS", defaults.persist_debounce_ms),
            early_warning: EarlyWarning {
                risk_threshold: env_or("DLS_RISK_THRESHOLD", defaults.early_warning.risk_threshold)
                    .clamp(0.0, 1.0),
                min_dls: env_or("DLS_RISK_MIN_DLS", defaults.early_warning.min_dls).min(100),
            },
            training: TrainingConfig {
                auto_train: env_flag("DLS_AUTO_TRAIN", defaults.training.auto_train),
                ..defaults.training
            },
            ..defaults
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn persist_debounce(&self) -> Duration {
        Duration::from_millis(self.persist_debounce_ms)
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(constants::DB_FILE_NAME)
    }
}

/// Get default data directory
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(constants::DATA_DIR_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_guard_contract() {
        let config = GuardConfig::default();
        assert_eq!(config.tick_interval(), Duration::from_secs(2));
        assert_eq!(config.deferred_capacity, 200);
        assert_eq!(config.training.min_samples, 200);
        assert_eq!(config.training.train_window, 800);
        assert_eq!(config.training.sample_capacity, 2000);
        assert_eq!(config.early_warning.min_dls, 45);
        assert!((config.early_warning.risk_threshold - 0.65).abs() < f32::EPSILON);
    }

    #[test]
    fn test_db_path_under_data_dir() {
        let config = GuardConfig {
            data_dir: PathBuf::from("/tmp/guard"),
            ..Default::default()
        };
        assert_eq!(config.db_path(), PathBuf::from("/tmp/guard/guard.db"));
    }
}
