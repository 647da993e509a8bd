//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! Runtime overrides are read from the environment by `logic::config`.

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "dls-guard";

/// Data directory name under the platform's local data dir
pub const DATA_DIR_NAME: &str = "dls-guard";

/// SQLite file holding the persisted session
pub const DB_FILE_NAME: &str = "guard.db";

/// Default tick interval (milliseconds)
pub const DEFAULT_TICK_MS: u64 = 2_000;

/// Default write-back debounce (milliseconds)
pub const DEFAULT_PERSIST_DEBOUNCE_MS: u64 = 800;

/// Early-warning override: model risk must exceed this
pub const DEFAULT_RISK_THRESHOLD: f32 = 0.65;

/// Early-warning override: DLS must be at least this
pub const DEFAULT_RISK_MIN_DLS: u8 = 45;

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Read a parsable value from the environment or use the default
pub fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

/// Read a boolean flag from the environment ("false"/"0" disable, anything else enables)
pub fn env_flag(name: &str, default: bool) -> bool {
    std::env::var(name)
        .map(|s| {
            let s = s.trim().to_lowercase();
            s != "false" && s != "0"
        })
        .unwrap_or(default)
}
