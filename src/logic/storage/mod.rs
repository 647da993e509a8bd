//! Storage Module - durable key-value persistence
//!
//! Session state is written as JSON documents under a handful of logical
//! keys. Backends implement `KeyValueStore`; the session never talks to a
//! backend directly but goes through the `WriteBackCache`.

pub mod memory;
pub mod sqlite;
pub mod write_back;


use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use write_back::{FlushReport, WriteBackCache};

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

// ============================================================================
// LOGICAL KEYS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageKey {
    Events,
    Deferred,
    Samples,
    ModelArtifacts,
    ModelMeta,
}

impl StorageKey {
    pub const ALL: [StorageKey; 5] = [
        StorageKey::Events,
        StorageKey::Deferred,
        StorageKey::Samples,
        StorageKey::ModelArtifacts,
        StorageKey::ModelMeta,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::Events => "dls_events",
            StorageKey::Deferred => "dls_deferred",
            StorageKey::Samples => "dls_samples",
            StorageKey::ModelArtifacts => "dls_model_artifacts",
            StorageKey::ModelMeta => "dls_model_meta",
        }
    }
}

impl std::fmt::Display for StorageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// BACKEND TRAIT
// ============================================================================

/// Durable string store. Values are JSON documents.
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Backend name for logs
    fn name(&self) -> &'static str;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Read and decode one logical key. Missing or unreadable values yield
/// `None`; decode failures are logged, never fatal.
pub fn load_json<T, S>(store: &S, key: StorageKey) -> Option<T>
where
    T: serde::de::DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    let raw = match store.get(key.as_str()) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            log::error!("Failed to read {}: {}", key, e);
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("Discarding unreadable {}: {}", key, e);
            None
        }
    }
}
