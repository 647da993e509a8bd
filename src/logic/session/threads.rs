//! Thread open bookkeeping for time-to-first-action pairing

use std::collections::HashMap;

/// Last open timestamp per thread, cleared by the first action on it
#[derive(Debug, Default)]
pub struct ThreadTracker {
    open_ts: HashMap<String, i64>,
}

impl ThreadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_open(&mut self, thread_id: &str, ts: i64) {
        self.open_ts.insert(thread_id.to_string(), ts);
    }

    /// Open timestamp for the thread, consuming the entry
    pub fn take_open(&mut self, thread_id: &str) -> Option<i64> {
        self.open_ts.remove(thread_id)
    }

    /// Drop opens older than `cutoff` that never saw an action
    pub fn prune(&mut self, cutoff: i64) -> usize {
        let before = self.open_ts.len();
        self.open_ts.retain(|_, ts| *ts >= cutoff);
        before - self.open_ts.len()
    }

    pub fn len(&self) -> usize {
        self.open_ts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.open_ts.is_empty()
    }

    pub fn clear(&mut self) {
        self.open_ts.clear();
    }
}

/// Seconds from open to first action, never negative
pub fn seconds_between(open_ts: i64, action_ts: i64) -> f64 {
    ((action_ts - open_ts) as f64 / 1000.0).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prune_drops_only_stale_opens() {
        let mut tracker = ThreadTracker::new();
        tracker.record_open("old", 100);
        tracker.record_open("fresh", 5_000);

        assert_eq!(tracker.prune(1_000), 1);
        assert_eq!(tracker.len(), 1);
        assert_eq!(tracker.take_open("fresh"), Some(5_000));
        assert_eq!(tracker.take_open("old"), None);
    }
}
