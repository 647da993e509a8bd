//! Write-back cache with a debounce flush policy
//!
//! Mutations only mark logical keys. A flush is due once `debounce_ms` has
//! passed since the first pending mark; it writes the current value of each
//! dirty key and deletes keys queued for removal. Anything that fails stays
//! pending and is retried on a later cycle.

use std::collections::BTreeSet;

use super::{KeyValueStore, StorageError, StorageKey};

#[derive(Debug, Default)]
pub struct FlushReport {
    pub written: usize,
    pub removed: usize,
    pub errors: Vec<(StorageKey, StorageError)>,
}

impl FlushReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Debug)]
pub struct WriteBackCache {
    dirty: BTreeSet<StorageKey>,
    removals: BTreeSet<StorageKey>,
    pending_since: Option<i64>,
    debounce_ms: i64,
}

impl WriteBackCache {
    pub fn new(debounce_ms: u64) -> Self {
        Self {
            dirty: BTreeSet::new(),
            removals: BTreeSet::new(),
            pending_since: None,
            debounce_ms: i64::try_from(debounce_ms).unwrap_or(i64::MAX),
        }
    }

    /// A key's in-memory value changed
    pub fn mark_dirty(&mut self, key: StorageKey, now: i64) {
        self.removals.remove(&key);
        self.dirty.insert(key);
        self.pending_since.get_or_insert(now);
    }

    /// A key must be deleted from the store
    pub fn mark_removed(&mut self, key: StorageKey, now: i64) {
        self.dirty.remove(&key);
        self.removals.insert(key);
        self.pending_since.get_or_insert(now);
    }

    pub fn is_dirty(&self, key: StorageKey) -> bool {
        self.dirty.contains(&key)
    }

    pub fn is_pending_removal(&self, key: StorageKey) -> bool {
        self.removals.contains(&key)
    }

    /// Keys waiting for a write or a delete
    pub fn pending_keys(&self) -> usize {
        self.dirty.len() + self.removals.len()
    }

    pub fn has_pending(&self) -> bool {
        self.pending_since.is_some()
    }

    pub fn is_due(&self, now: i64) -> bool {
        match self.pending_since {
            Some(since) => now - since >= self.debounce_ms,
            None => false,
        }
    }

    /// Write everything pending. `snapshot` renders the current JSON for a key.
    pub fn flush<S, F>(&mut self, store: &S, now: i64, mut snapshot: F) -> FlushReport
    where
        S: KeyValueStore + ?Sized,
        F: FnMut(StorageKey) -> Result<String, StorageError>,
    {
        let mut report = FlushReport::default();

        for key in std::mem::take(&mut self.removals) {
            match store.remove(key.as_str()) {
                Ok(()) => report.removed += 1,
                Err(e) => {
                    self.removals.insert(key);
                    report.errors.push((key, e));
                }
            }
        }

        for key in std::mem::take(&mut self.dirty) {
            let result = snapshot(key).and_then(|json| store.set(key.as_str(), &json));
            match result {
                Ok(()) => report.written += 1,
                Err(e) => {
                    self.dirty.insert(key);
                    report.errors.push((key, e));
                }
            }
        }

        self.pending_since = if self.dirty.is_empty() && self.removals.is_empty() {
            None
        } else {
            Some(now)
        };

        report
    }
}
