//! Feature Layout - the classifier's input contract
//!
//! Position `i` of every feature vector means `FEATURE_LAYOUT[i]`. Saved
//! models are stamped with `LayoutStamp::current()` and refused on load
//! when the stamp differs. Any edit to the list bumps `FEATURE_VERSION`.

use crc32fast::Hasher;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const FEATURE_VERSION: u8 = 1;

pub const FEATURE_COUNT: usize = 7;

pub const FEATURE_LAYOUT: [&str; FEATURE_COUNT] = [
    "events_per_minute",      // substantive events per window minute
    "reopen_rate",            // reopens / opens
    "avg_time_to_action",     // seconds from open to first action
    "undo_rate",              // undos / clicks
    "context_switch_rate",    // context switches per window minute
    "indecision_time_ratio",  // hover seconds / window seconds
    "decision_variety_count", // distinct click actions
];

/// CRC32 over the version byte and each NUL-terminated name
pub fn compute_layout_hash() -> u32 {
    let mut crc = Hasher::new();
    crc.update(&[FEATURE_VERSION]);
    for name in FEATURE_LAYOUT {
        crc.update(name.as_bytes());
        crc.update(b"\0");
    }
    crc.finalize()
}

static LAYOUT_HASH: Lazy<u32> = Lazy::new(compute_layout_hash);

pub fn layout_hash() -> u32 {
    *LAYOUT_HASH
}

// ============================================================================
// STAMP
// ============================================================================

/// Version + hash pair carried by vectors and model artifacts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutStamp {
    pub version: u8,
    pub hash: u32,
}

impl LayoutStamp {
    pub fn current() -> Self {
        Self {
            version: FEATURE_VERSION,
            hash: layout_hash(),
        }
    }

    pub fn check(self) -> Result<(), LayoutMismatchError> {
        let expected = Self::current();
        if self == expected {
            Ok(())
        } else {
            Err(LayoutMismatchError { expected, found: self })
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error(
    "feature layout mismatch: stored v{} ({:08x}), current v{} ({:08x})",
    found.version, found.hash, expected.version, expected.hash
)]
pub struct LayoutMismatchError {
    pub expected: LayoutStamp,
    pub found: LayoutStamp,
}

pub fn validate_layout(version: u8, hash: u32) -> Result<(), LayoutMismatchError> {
    LayoutStamp { version, hash }.check()
}

pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_LAYOUT.iter().position(|&n| n == name)
}

pub fn feature_name(index: usize) -> Option<&'static str> {
    FEATURE_LAYOUT.get(index).copied()
}
