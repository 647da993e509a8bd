//! Decision Inbox - references the user postponed

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeferSource {
    #[default]
    Inbox,
    Thread,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeferredItem {
    /// Always starts with `#`
    #[serde(alias = "hash")]
    pub reference: String,
    #[serde(rename = "ts", alias = "timestamp")]
    pub timestamp: i64,
    pub source: DeferSource,
}

/// Trim and prefix with `#`; blank references are rejected
pub fn normalize_reference(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.starts_with('#') {
        Some(trimmed.to_string())
    } else {
        Some(format!("#{}", trimmed))
    }
}

/// Newest first, unique by reference, capped
#[derive(Debug, Clone)]
pub struct DeferredList {
    items: Vec<DeferredItem>,
    capacity: usize,
}

impl DeferredList {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: Vec::new(),
            capacity,
        }
    }

    /// Restore from storage. Stored order is kept; bad or duplicate
    /// references are dropped.
    pub fn from_items(items: Vec<DeferredItem>, capacity: usize) -> Self {
        let mut list = Self::new(capacity);
        for mut item in items {
            let Some(reference) = normalize_reference(&item.reference) else {
                continue;
            };
            if list.contains(&reference) {
                continue;
            }
            item.reference = reference;
            list.items.push(item);
        }
        list.items.truncate(capacity);
        list
    }

    pub fn contains(&self, reference: &str) -> bool {
        self.items.iter().any(|d| d.reference == reference)
    }

    /// Insert at the front. Returns false if already present (the existing
    /// entry keeps its position).
    pub fn add(&mut self, item: DeferredItem) -> bool {
        if self.contains(&item.reference) {
            return false;
        }
        self.items.insert(0, item);
        self.items.truncate(self.capacity);
        true
    }

    pub fn remove(&mut self, reference: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|d| d.reference != reference);
        self.items.len() != before
    }

    pub fn items(&self) -> &[DeferredItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}
